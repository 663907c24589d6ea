use forge_client::ImageRef;

/// Bypassed entirely — never checked, never seeded. `kaniko-executor`
/// images are built into the runner base image in every deployment
/// this gateway has seen.
const SKIP_PATTERNS: &[&str] = &["kaniko-executor", "kaniko"];

pub fn is_skip_pattern(nexus_name: &str) -> bool {
  SKIP_PATTERNS.iter().any(|p| nexus_name.contains(p))
}

/// Fixed reverse mapping from a Nexus-hyphenated bare name back to its
/// public origin reference. Anything not in this table is assumed to
/// already be in `namespace/name` form (or bare, defaulting to
/// `library/<name>`).
const NEXUS_TO_DOCKERHUB: &[(&str, &str)] = &[
  ("curlimages-curl", "curlimages/curl"),
  ("kaniko-executor", "gcr.io/kaniko-project/executor"),
  ("sonarsource-sonar-scanner-cli", "sonarsource/sonar-scanner-cli"),
  ("aquasec-trivy", "aquasec/trivy"),
  ("bitnami-git", "bitnami/git"),
  ("hadolint-hadolint", "hadolint/hadolint"),
  ("checkmarx-kics", "checkmarx/kics"),
  ("grafana-grafana", "grafana/grafana"),
];

/// The public reference to pull `image` from, before copying it into
/// the private registry.
pub fn public_ref_for(image: &ImageRef) -> String {
  let name = image.nexus_name();
  if let Some((_, dockerhub)) =
    NEXUS_TO_DOCKERHUB.iter().find(|(nexus, _)| *nexus == name)
  {
    return format!("{dockerhub}:{}", image.tag);
  }

  match &image.namespace {
    Some(ns) => format!("{ns}/{}:{}", image.name, image.tag),
    None => format!("library/{}:{}", image.name, image.tag),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_mapping_round_trips() {
    let image = ImageRef::parse("aquasec-trivy:0.50.0");
    assert_eq!(public_ref_for(&image), "aquasec/trivy:0.50.0");
  }

  #[test]
  fn unknown_namespaced_passes_through() {
    let image = ImageRef::parse("curlimages/curl:8.1.0");
    assert_eq!(public_ref_for(&image), "curlimages/curl:8.1.0");
  }

  #[test]
  fn bare_name_defaults_to_library() {
    let image = ImageRef::parse("alpine:3.19");
    assert_eq!(public_ref_for(&image), "library/alpine:3.19");
  }

  #[test]
  fn skip_pattern_matches_by_substring() {
    assert!(is_skip_pattern("kaniko-executor"));
    assert!(!is_skip_pattern("aquasec-trivy"));
  }
}
