//! Structural, schema, and policy validation of generated artifacts.
//! Checks are independent and all run (where their dependencies are
//! reachable); each contributes errors and/or warnings to one report.

mod policy;
pub mod required_sections;
mod remote_lint;
mod structural;
mod variables;

use forge_client::{ArtifactSet, ValidationReport};
use tracing::instrument;

use crate::image_seeder;
use crate::registry_gateway;

#[instrument(level = "debug", skip(artifacts))]
pub async fn validate(artifacts: &ArtifactSet) -> ValidationReport {
  let mut report = ValidationReport::default();

  report.extend(structural::check(artifacts));
  // Required-sections and variable-consistency assume the artifact at
  // least parsed; skip them on a fatal structural break; remote lint
  // and image checks still run on whatever other files there are.
  if !report.has_errors() {
    report.extend(required_sections::check(artifacts));
    report.extend(variables::check(artifacts).await);
  }
  report.extend(policy::check(artifacts));
  report.extend(remote_lint::check(artifacts).await);
  report.extend(image_availability(artifacts).await);

  report
}

/// Image availability never produces errors, only warnings — a
/// transient registry outage must not block generation.
async fn image_availability(
  artifacts: &ArtifactSet,
) -> Vec<forge_client::ValidationDiagnostic> {
  let images = image_seeder::extract_image_refs(artifacts);
  let mut diagnostics = Vec::new();
  for image in images {
    match registry_gateway::exists(&image).await {
      Some(false) => diagnostics.push(forge_client::ValidationDiagnostic::warning(
        "image-availability",
        format!("{} not yet present in the private registry", image.nexus_bare()),
      )),
      Some(true) => {}
      None => diagnostics.push(forge_client::ValidationDiagnostic::warning(
        "image-availability",
        format!("could not reach the registry to check {}, skipped", image.nexus_bare()),
      )),
    }
  }
  diagnostics
}
