use std::sync::OnceLock;

use forge_client::{ArtifactSet, TargetPlatform, ValidationDiagnostic};
use regex::Regex;

/// Variables every target platform provides at runtime without a
/// declaration — referencing these is never an error.
const BUILTIN_VARS: &[&str] = &[
  "CI_PROJECT_ID", "CI_COMMIT_SHA", "CI_COMMIT_BRANCH", "CI_REGISTRY",
  "CI_REGISTRY_USER", "CI_REGISTRY_PASSWORD", "GITHUB_TOKEN", "GITHUB_SHA",
  "GITHUB_REF", "BUILD_NUMBER", "WORKSPACE", "env",
];

fn var_ref_pattern() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\$\{?\{?\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}?\}?").unwrap())
}

fn declaration_pattern() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?m)^\s*variable\s*"([A-Za-z_][A-Za-z0-9_]*)""#).unwrap())
}

pub async fn check(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  if artifacts.platform != TargetPlatform::Infra {
    // Non-infra platforms rely on each other's built-in variable
    // namespace (CI_*, GITHUB_*, env.*) which this check cannot fully
    // enumerate; infra is where undeclared variables are unambiguous.
    return Vec::new();
  }

  let declared: std::collections::HashSet<String> = artifacts
    .files
    .values()
    .flat_map(|content| {
      declaration_pattern()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect::<Vec<_>>()
    })
    .collect();

  let mut diagnostics = Vec::new();
  for content in artifacts.files.values() {
    for cap in var_ref_pattern().captures_iter(content) {
      let name = cap[1].split('.').next().unwrap_or(&cap[1]).to_uppercase();
      if BUILTIN_VARS.contains(&name.as_str()) {
        continue;
      }
      let raw = &cap[1];
      if !declared.contains(raw) {
        diagnostics.push(ValidationDiagnostic::error(
          "variable-consistency",
          format!("reference to undeclared variable '{raw}'"),
        ));
      }
    }
  }

  // Only worth shelling out to terraform if the static check found
  // nothing wrong with declarations — a missing variable will also
  // fail `terraform validate`, and that error is less actionable.
  if diagnostics.is_empty() {
    diagnostics.extend(crate::infra_executor::validate_artifacts(artifacts).await);
  }
  diagnostics
}
