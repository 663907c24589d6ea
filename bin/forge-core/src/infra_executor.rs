//! Infra-execution subprocess tool: shells out `terraform`'s
//! `init`/`validate`/`plan`/`apply`/`destroy` against a scratch
//! workspace populated from an artifact set. `init`/`validate`/`plan`
//! back the infra validator's pre-commit check; `apply`/`destroy` are
//! exposed for the operator-driven half of the lifecycle this tool
//! covers, after a reviewed commit lands. Grounded on the `skopeo`
//! subprocess pattern in the registry gateway — this is the other
//! spec-mandated subprocess tool, invoked against a terraform root
//! instead of an image reference.

use std::path::{Path, PathBuf};
use std::time::Duration;

use command::run_forge_command;
use forge_client::ArtifactSet;
use tracing::{instrument, warn};

use crate::workspace;

const TERRAFORM_BIN: &str = "terraform";
const EXEC_TIMEOUT: Duration = Duration::from_secs(180);

pub struct ExecutionOutcome {
  pub success: bool,
  pub stdout: String,
  pub stderr: String,
}

pub enum PlanOutcome {
  NoChanges,
  ChangesPresent,
}

struct PreparedWorkspace {
  root: PathBuf,
  exec_dir: PathBuf,
}

/// Writes every artifact file into a fresh workspace directory,
/// preserving relative paths, and returns the directory terraform
/// should be invoked from — the parent of whichever file path contains
/// the `.tf` root, or the workspace root itself if every file is
/// top-level.
async fn prepare(artifacts: &ArtifactSet) -> anyhow::Result<PreparedWorkspace> {
  let root = workspace::create().await?;
  for (path, content) in &artifacts.files {
    let target = root.join(path);
    if let Some(parent) = target.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, content).await?;
  }

  let exec_dir = artifacts
    .files
    .keys()
    .find_map(|p| {
      let parent = Path::new(p).parent()?;
      (!parent.as_os_str().is_empty()).then(|| root.join(parent))
    })
    .unwrap_or_else(|| root.clone());

  Ok(PreparedWorkspace { root, exec_dir })
}

async fn run(dir: &Path, args: &str) -> ExecutionOutcome {
  let log = tokio::time::timeout(
    EXEC_TIMEOUT,
    run_forge_command("infra-exec", Some(dir), format!("{TERRAFORM_BIN} {args}")),
  )
  .await;

  match log {
    Ok(log) => ExecutionOutcome { success: log.success, stdout: log.stdout, stderr: log.stderr },
    Err(_) => ExecutionOutcome {
      success: false,
      stdout: String::new(),
      stderr: format!("{TERRAFORM_BIN} {args} timed out after {EXEC_TIMEOUT:?}"),
    },
  }
}

pub async fn init(dir: &Path) -> ExecutionOutcome {
  run(dir, "init -input=false -no-color").await
}

pub async fn validate(dir: &Path) -> ExecutionOutcome {
  run(dir, "validate -no-color").await
}

/// Runs `plan` with a detailed-exitcode request; terraform's stdout
/// always states "No changes." or a "Plan: N to add, ..." summary line
/// regardless of how the exit code surfaces through the subprocess
/// wrapper, so the outcome is read from stdout rather than relying on
/// the wrapper exposing a raw exit status.
pub async fn plan(dir: &Path) -> anyhow::Result<(PlanOutcome, ExecutionOutcome)> {
  let outcome = run(dir, "plan -input=false -no-color -detailed-exitcode").await;
  if outcome.stdout.contains("No changes.") {
    return Ok((PlanOutcome::NoChanges, outcome));
  }
  if outcome.stdout.contains("Plan:") {
    return Ok((PlanOutcome::ChangesPresent, outcome));
  }
  anyhow::bail!("terraform plan produced no recognizable summary: {}", outcome.stderr)
}

pub async fn apply(dir: &Path) -> ExecutionOutcome {
  run(dir, "apply -input=false -no-color -auto-approve").await
}

pub async fn destroy(dir: &Path) -> ExecutionOutcome {
  run(dir, "destroy -input=false -no-color -auto-approve").await
}

/// Pre-commit check for the infra target: `init` then `validate`
/// against the generated `.tf` content, best-effort — an unreachable
/// `terraform` binary or a provider plugin fetch failure skips the
/// check instead of failing generation over infrastructure this
/// service doesn't control. A genuine syntax/schema error from
/// `validate` is returned as an error diagnostic.
#[instrument(level = "debug", skip_all)]
pub async fn validate_artifacts(artifacts: &ArtifactSet) -> Vec<forge_client::ValidationDiagnostic> {
  let prepared = match prepare(artifacts).await {
    Ok(prepared) => prepared,
    Err(err) => {
      warn!("could not prepare infra workspace, skipping terraform validate: {err:#}");
      return Vec::new();
    }
  };

  let diagnostics = run_validate(&prepared.exec_dir).await;

  if let Err(err) = workspace::remove(&prepared.root).await {
    warn!("failed to clean up infra workspace: {err:#}");
  }

  diagnostics
}

async fn run_validate(exec_dir: &Path) -> Vec<forge_client::ValidationDiagnostic> {
  let init_result = init(exec_dir).await;
  if !init_result.success {
    warn!("terraform init failed, skipping validate: {}", init_result.stderr);
    return Vec::new();
  }

  let result = validate(exec_dir).await;
  if result.success {
    Vec::new()
  } else {
    vec![forge_client::ValidationDiagnostic::error(
      "infra-execution",
      format!("terraform validate failed: {}", result.stderr),
    )]
  }
}
