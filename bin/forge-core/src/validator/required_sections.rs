use forge_client::{ArtifactSet, TargetPlatform, ValidationDiagnostic};
use serde_yaml_ng::Value;

/// The exact, ordered stage/job set every hosted-pipeline, build-server,
/// and runner-service artifact must declare. Taken verbatim from the
/// platform's required-stage contract — this set is explicit project
/// text and must never be replaced by a shorter or differently-named
/// list, even where other sources (templates, fix prompts) use
/// different job names internally.
pub const REQUIRED_STAGES: &[&str] = &[
  "compile", "build", "test", "sast", "quality", "security", "push", "notify", "learn",
];

pub fn check(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  match artifacts.platform {
    TargetPlatform::HostedPipeline => check_hosted_pipeline(artifacts),
    TargetPlatform::BuildServer => check_build_server(artifacts),
    TargetPlatform::RunnerService => check_runner_service(artifacts),
    TargetPlatform::Infra => Vec::new(),
  }
}

fn check_hosted_pipeline(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  let Some(content) = artifacts.files.get("pipeline.yml") else {
    return vec![ValidationDiagnostic::error(
      "required-sections",
      "missing pipeline.yml",
    )];
  };
  let Ok(doc) = serde_yaml_ng::from_str::<Value>(content) else {
    return Vec::new(); // structural check already reported this
  };

  let declared_stages: Vec<String> = doc
    .get("stages")
    .and_then(Value::as_sequence)
    .map(|seq| seq.iter().filter_map(|v| v.as_str().map(String::from)).collect())
    .unwrap_or_default();

  let mut diagnostics = Vec::new();
  for required in REQUIRED_STAGES {
    if !declared_stages.iter().any(|s| s == required) {
      diagnostics.push(ValidationDiagnostic::error(
        "required-sections",
        format!("pipeline.yml is missing required stage '{required}'"),
      ));
    }
  }
  diagnostics
}

fn check_build_server(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  let Some(content) = artifacts.files.get("Jenkinsfile") else {
    return vec![ValidationDiagnostic::error(
      "required-sections",
      "missing Jenkinsfile",
    )];
  };

  let mut diagnostics = Vec::new();
  for required in REQUIRED_STAGES {
    let needle = format!("stage('{}", capitalize(required));
    let needle_double = format!("stage(\"{}", capitalize(required));
    if !content.contains(&needle) && !content.contains(&needle_double) {
      diagnostics.push(ValidationDiagnostic::error(
        "required-sections",
        format!("Jenkinsfile is missing required stage '{required}'"),
      ));
    }
  }
  diagnostics
}

fn check_runner_service(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  let Some(content) = artifacts.files.get(".github/workflows/pipeline.yml") else {
    return vec![ValidationDiagnostic::error(
      "required-sections",
      "missing .github/workflows/pipeline.yml",
    )];
  };
  let Ok(doc) = serde_yaml_ng::from_str::<Value>(content) else {
    return Vec::new();
  };

  let jobs: Vec<String> = doc
    .get("jobs")
    .and_then(Value::as_mapping)
    .map(|m| m.keys().filter_map(|k| k.as_str().map(String::from)).collect())
    .unwrap_or_default();

  let mut diagnostics = Vec::new();
  for required in REQUIRED_STAGES {
    if !jobs.iter().any(|j| j == required) {
      diagnostics.push(ValidationDiagnostic::error(
        "required-sections",
        format!("workflow is missing required job '{required}'"),
      ));
    }
  }
  diagnostics
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}
