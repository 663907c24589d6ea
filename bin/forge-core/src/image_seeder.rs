//! Extracts image references out of a generated artifact set and hands
//! them to the registry gateway. Regexes are grounded on the GitLab
//! and GitHub Actions image-seeders this pipeline was distilled from,
//! generalized across target platforms with one combined pattern set.

use std::sync::OnceLock;

use forge_client::{ArtifactSet, ImageRef};
use regex::Regex;

use crate::registry_gateway::{self, SeedSummary};

fn patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS.get_or_init(|| {
    vec![
      Regex::new(r#"(?m)^\s*image:\s*["']?([^\s"'#]+)"#).unwrap(),
      Regex::new(r#"(?m)container:\s*["']?([^\s"'#]+)"#).unwrap(),
      Regex::new(r#"(?m)uses:\s*docker://([^\s"']+)"#).unwrap(),
      Regex::new(r#"(?m)FROM\s+([^\s]+)"#).unwrap(),
      Regex::new(r#"(?m)docker\s+(?:pull|run|inspect)\s+["']?([^\s"'|&;]+)"#).unwrap(),
    ]
  })
}

fn variable_prefix() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"^\$\{?\{?\s*[\w.]*REGISTRY[\w.]*\s*\}?\}?/"#).unwrap()
  })
}

/// Extracts unique, normalized bare image references across every file
/// in the artifact set.
pub fn extract_image_refs(artifacts: &ArtifactSet) -> Vec<ImageRef> {
  let mut seen = std::collections::HashSet::new();
  let mut out = Vec::new();

  for content in artifacts.files.values() {
    for pattern in patterns() {
      for cap in pattern.captures_iter(content) {
        let raw = cap[1].trim();
        if raw.starts_with('$') && !variable_prefix().is_match(raw) {
          continue;
        }
        if raw.starts_with('-') {
          continue;
        }
        let normalized = variable_prefix().replace(raw, "").to_string();
        if normalized.is_empty() || normalized.starts_with('$') {
          continue;
        }
        let image = ImageRef::parse(&normalized);
        if seen.insert(image.nexus_bare()) {
          out.push(image);
        }
      }
    }
  }

  out
}

/// Best-effort: extracts image references from the artifact set and
/// ensures each exists in the private registry. Failures never block
/// the caller.
pub async fn ensure_images_for(artifacts: &ArtifactSet) -> SeedSummary {
  let images = extract_image_refs(artifacts);
  if images.is_empty() {
    return SeedSummary::default();
  }
  registry_gateway::ensure_images(&images).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use forge_client::{Language, PackageManager, RepoDescriptor, HostKind, TargetPlatform};

  fn descriptor() -> RepoDescriptor {
    RepoDescriptor {
      host: HostKind::GiteaStyle,
      owner: "acme".into(),
      repo: "widgets".into(),
      default_branch: "main".into(),
      language: Language::Java,
      framework: None,
      package_manager: PackageManager::Maven,
      file_list: vec![],
      has_artifacts: false,
    }
  }

  #[test]
  fn extracts_image_and_from_lines() {
    let mut artifacts = ArtifactSet::new(TargetPlatform::HostedPipeline, descriptor());
    artifacts.set(
      "pipeline.yml",
      "build:\n  image: maven-3.9-eclipse-temurin-17\n  script: [\"mvn package\"]\n",
    );
    artifacts.set("container.build", "FROM eclipse-temurin:17\nRUN echo hi\n");

    let refs = extract_image_refs(&artifacts);
    assert_eq!(refs.len(), 2);
    assert!(refs.iter().any(|r| r.name == "maven-3.9-eclipse-temurin-17"));
    assert!(refs.iter().any(|r| r.name == "eclipse-temurin" && r.tag == "17"));
  }

  #[test]
  fn skips_bare_variable_refs() {
    let mut artifacts = ArtifactSet::new(TargetPlatform::HostedPipeline, descriptor());
    artifacts.set("pipeline.yml", "build:\n  image: $CI_IMAGE\n");
    assert!(extract_image_refs(&artifacts).is_empty());
  }
}
