//! Best-effort remote lint against the pipeline-service's lint
//! endpoint, when the target platform has one configured. A missing
//! config value or an unreachable endpoint skips the check rather than
//! failing it — remote lint is additive, not load-bearing.

use forge_client::{ArtifactSet, ValidationDiagnostic};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::core_config;
use crate::http_client;

#[derive(Deserialize)]
struct LintResponse {
  #[serde(default)]
  valid: bool,
  #[serde(default)]
  errors: Vec<String>,
  #[serde(default)]
  warnings: Vec<String>,
}

pub async fn check(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  let url = &core_config().pipeline_service_lint_url;
  if url.is_empty() {
    return Vec::new();
  }

  let payload = json!({
    "platform": artifacts.platform.as_str(),
    "files": artifacts.files,
  });

  let response = match http_client::client().post(url).json(&payload).send().await {
    Ok(res) => res,
    Err(err) => {
      debug!("remote lint endpoint unreachable, skipping: {err:#}");
      return vec![skipped_diagnostic(&err.to_string())];
    }
  };

  let response = match response.error_for_status() {
    Ok(res) => res,
    Err(err) => {
      warn!("remote lint endpoint returned an error status, skipping: {err:#}");
      return vec![skipped_diagnostic(&err.to_string())];
    }
  };

  let body = match response.json::<LintResponse>().await {
    Ok(body) => body,
    Err(err) => {
      warn!("remote lint response was not the expected shape, skipping: {err:#}");
      return vec![skipped_diagnostic(&err.to_string())];
    }
  };

  if body.valid && body.errors.is_empty() && body.warnings.is_empty() {
    return Vec::new();
  }

  let mut diagnostics: Vec<ValidationDiagnostic> = body
    .errors
    .into_iter()
    .map(|message| ValidationDiagnostic::error("remote-lint", message))
    .collect();
  diagnostics.extend(
    body
      .warnings
      .into_iter()
      .map(|message| ValidationDiagnostic::warning("remote-lint", message)),
  );
  diagnostics
}

/// Remote lint being unreachable is not itself a validation failure,
/// but it's surfaced as a warning rather than swallowed, so a caller
/// can tell "lint passed" from "lint didn't run."
fn skipped_diagnostic(reason: &str) -> ValidationDiagnostic {
  ValidationDiagnostic::warning("remote-lint", format!("remote lint skipped: {reason}"))
}
