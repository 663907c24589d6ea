mod parse;
mod postprocess;
mod prompt;

use forge_client::{ArtifactSet, FixAttemptRecord, FixHistory, FixOutcome};
use tracing::{instrument, warn};

use crate::llm::{GenerateOptions, GenerateRequest, LlmProvider, system_prompt};
use crate::registry_gateway;
use crate::validator;

const PUBLIC_REGISTRY_HOSTS: &[&str] =
  &["docker.io", "index.docker.io", "ghcr.io", "quay.io", "gcr.io"];
const PRIVATE_REGISTRY_VAR: &str = "${PRIVATE_REGISTRY}";

/// Parses a freshly-generated (not-yet-validated) LLM response into a
/// filename -> content map, applying the same post-processing rules
/// the repair loop uses. Shared with the generator's first-pass LLM
/// path so every LLM output, fixed or not, goes through one rewrite
/// pipeline.
pub fn parse_response_for_generation(
  response: &str,
  known_files: &[String],
) -> Option<std::collections::HashMap<String, String>> {
  let files = parse::parse_response(response, known_files)?;
  Some(
    files
      .into_iter()
      .map(|(name, content)| {
        (name, postprocess::apply(content, PUBLIC_REGISTRY_HOSTS, PRIVATE_REGISTRY_VAR))
      })
      .collect(),
  )
}

pub struct FixResult {
  pub artifacts: ArtifactSet,
  pub outcome: FixOutcome,
  pub history: FixHistory,
}

/// Iterative validator-driven repair: validate, and while errors
/// remain, ask the LLM to fix them, applying post-processing rules to
/// every response before re-validating. Bounded by `max_attempts`.
#[instrument(level = "info", skip(provider, artifacts), fields(model = %model))]
pub async fn fix_validation_errors(
  provider: &dyn LlmProvider,
  model: &str,
  mut artifacts: ArtifactSet,
  max_attempts: u32,
) -> FixResult {
  let mut history = FixHistory::default();
  let mut attempt = 1;

  loop {
    let report = validator::validate(&artifacts).await;
    let has_errors = report.has_errors();

    if !has_errors {
      history.push(FixAttemptRecord { attempt_index: attempt, report, applied: false });
      return FixResult { artifacts, outcome: FixOutcome::Fixed, history };
    }

    if attempt >= max_attempts {
      history.push(FixAttemptRecord { attempt_index: attempt, report, applied: false });
      return FixResult { artifacts, outcome: FixOutcome::Exhausted, history };
    }

    let known_files: Vec<String> = artifacts.files.keys().cloned().collect();
    let allowed_images = allowed_image_names().await;
    let repair_prompt = prompt::repair_prompt(&artifacts, &report, &allowed_images);

    let response = provider
      .generate(GenerateRequest {
        model,
        prompt: &repair_prompt,
        system: system_prompt(),
        options: GenerateOptions::default(),
      })
      .await;

    let applied = match response {
      Ok(text) => apply_response(&mut artifacts, &text, &known_files),
      Err(err) => {
        warn!("fixer llm call failed on attempt {attempt}: {err:#}");
        false
      }
    };

    history.push(FixAttemptRecord { attempt_index: attempt, report, applied });
    attempt += 1;
  }
}

/// Single-pass repair driven by a failed build's job log, used by the
/// monitor. Reuses the same response parser and post-processing rules
/// as the iterative loop, but never retries on its own — the monitor
/// owns the per-request attempt counter across build cycles.
#[instrument(level = "info", skip(provider, artifacts, log_excerpt))]
pub async fn fix_from_job_log(
  provider: &dyn LlmProvider,
  model: &str,
  mut artifacts: ArtifactSet,
  failed_job: &str,
  log_excerpt: &str,
) -> Option<ArtifactSet> {
  let known_files: Vec<String> = artifacts.files.keys().cloned().collect();
  let repair_prompt = prompt::runtime_failure_prompt(&artifacts, failed_job, log_excerpt);

  let response = provider
    .generate(GenerateRequest {
      model,
      prompt: &repair_prompt,
      system: system_prompt(),
      options: GenerateOptions::default(),
    })
    .await
    .inspect_err(|err| warn!("runtime-failure fixer llm call failed: {err:#}"))
    .ok()?;

  if apply_response(&mut artifacts, &response, &known_files) {
    Some(artifacts)
  } else {
    None
  }
}

fn apply_response(
  artifacts: &mut ArtifactSet,
  response: &str,
  known_files: &[String],
) -> bool {
  let Some(files) = parse::parse_response(response, known_files) else {
    return false;
  };
  if files.is_empty() {
    return false;
  }

  for (name, content) in files {
    if content.trim().is_empty() {
      continue;
    }
    let rewritten = postprocess::apply(content, PUBLIC_REGISTRY_HOSTS, PRIVATE_REGISTRY_VAR);
    artifacts.set(name, rewritten);
  }
  true
}

async fn allowed_image_names() -> Vec<String> {
  // Best-effort: an unreachable registry just means the fix prompt
  // omits the "already available" hint, not a hard failure.
  registry_gateway::catalog().await.unwrap_or_default()
}
