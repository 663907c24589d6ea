use forge_client::{ArtifactSet, ValidationDiagnostic};

/// Public registry hosts that must never appear in a committed
/// artifact — every image must come from the private registry.
const PUBLIC_REGISTRY_HOSTS: &[&str] =
  &["docker.io", "index.docker.io", "ghcr.io", "quay.io", "gcr.io"];

pub fn check(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  let mut diagnostics = Vec::new();

  for (name, content) in &artifacts.files {
    for host in PUBLIC_REGISTRY_HOSTS {
      if content.contains(host) {
        diagnostics.push(ValidationDiagnostic::error(
          "policy",
          format!("{name} references public registry host '{host}'"),
        ));
      }
    }
    if content.contains("https://") && content.to_lowercase().contains("registry") {
      diagnostics.push(ValidationDiagnostic::warning(
        "policy",
        format!("{name} may reference the private registry over HTTPS; it is HTTP-only"),
      ));
    }
  }

  diagnostics
}
