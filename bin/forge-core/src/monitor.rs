//! Long-running per-commit supervisor: polls the build host, and on
//! failure drives a single-pass LLM repair + re-commit cycle, bounded
//! by `max_attempts`. Poll-loop shape grounded on the scheduled-task
//! executor loop in the teacher; the self-healing state machine itself
//! has no teacher precedent and is grounded on the pipeline-monitor
//! logic this pipeline was distilled from.

use std::{sync::Arc, time::Duration};

use forge_client::{ArtifactSet, ProgressStage, TargetPlatform};
use tracing::{info, instrument, warn};

use crate::committer;
use crate::config::core_config;
use crate::fixer;
use crate::host_client::HostClient;
use crate::llm;
use crate::progress::ProgressStore;
use crate::templates::{TemplateStore, learning};

pub struct MonitorHandle {
  cancel: Arc<tokio::sync::Notify>,
}

impl MonitorHandle {
  pub fn cancel(&self) {
    self.cancel.notify_one();
  }
}

struct MonitorContext {
  host: HostClient,
  owner: String,
  repo: String,
  branch: String,
  platform: TargetPlatform,
}

/// Spawns the supervisor as a background task and returns a handle the
/// caller can use to cancel it. One instance per successful commit.
pub fn spawn(
  host: HostClient,
  owner: String,
  repo: String,
  branch: String,
  platform: TargetPlatform,
  artifacts: ArtifactSet,
  progress: Arc<ProgressStore>,
  store: Arc<TemplateStore>,
) -> MonitorHandle {
  let cancel = Arc::new(tokio::sync::Notify::new());
  let cancel_clone = cancel.clone();

  let ctx = MonitorContext { host, owner, repo, branch, platform };
  tokio::spawn(async move {
    run(ctx, artifacts, progress, store, cancel_clone).await;
  });

  MonitorHandle { cancel }
}

#[instrument(level = "info", skip_all, fields(repo = %ctx.repo, branch = %ctx.branch))]
async fn run(
  mut ctx: MonitorContext,
  mut artifacts: ArtifactSet,
  progress: Arc<ProgressStore>,
  store: Arc<TemplateStore>,
  cancel: Arc<tokio::sync::Notify>,
) {
  let cfg = core_config();
  let max_attempts = cfg.max_fix_attempts;
  let project_id = format!("{}/{}", ctx.owner, ctx.repo);
  progress.create(project_id.clone(), ctx.branch.clone(), max_attempts);

  let mut attempt = 0u32;
  let start = tokio::time::Instant::now();
  let discovery_timeout = Duration::from_secs(cfg.monitor_discovery_timeout_secs);
  let poll_interval = Duration::from_secs(cfg.monitor_poll_secs);

  'outer: loop {
    // MONITORING: wait for a build to appear for this branch.
    let build_id = loop {
      if start.elapsed() > discovery_timeout {
        progress.complete(
          &project_id,
          &ctx.branch,
          ProgressStage::Failure,
          "timed out waiting for a build to start",
        );
        return;
      }
      match ctx.host.list_builds(&ctx.owner, &ctx.repo, &ctx.branch).await {
        Ok(builds) if !builds.is_empty() => break builds[0].id.clone(),
        Ok(_) => {}
        Err(err) => warn!("build discovery poll failed: {err:#}"),
      }
      if sleep_or_cancelled(poll_interval, &cancel).await {
        progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "cancelled");
        return;
      }
    };

    progress.update(&project_id, &ctx.branch, ProgressStage::Running, "build running", attempt);

    // RUNNING: poll until the build reaches a terminal status.
    let final_status = loop {
      match ctx.host.list_builds(&ctx.owner, &ctx.repo, &ctx.branch).await {
        Ok(builds) => {
          if let Some(build) = builds.iter().find(|b| b.id == build_id) {
            if is_terminal(&build.status) {
              break build.status.clone();
            }
          }
        }
        Err(err) => warn!("build status poll failed: {err:#}"),
      }
      if sleep_or_cancelled(poll_interval, &cancel).await {
        progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "cancelled");
        return;
      }
    };

    if is_success(&final_status) {
      let duration = start.elapsed().as_secs_f64();
      if let Err(err) = learning::record_success(&store, ctx.platform, &artifacts, duration).await
      {
        warn!("failed to record successful build in learning store: {err:#}");
      }
      progress.complete(&project_id, &ctx.branch, ProgressStage::Success, "build succeeded");
      return;
    }

    // DIAGNOSING -> FIX_LOOP
    progress.update(&project_id, &ctx.branch, ProgressStage::Diagnosing, "build failed, diagnosing", attempt);
    if attempt >= max_attempts {
      progress.complete(
        &project_id,
        &ctx.branch,
        ProgressStage::Failure,
        "exhausted fix attempts without a successful build",
      );
      return;
    }
    attempt += 1;

    let log_excerpt = match ctx.host.get_job_log(&ctx.owner, &ctx.repo, &build_id, 8 * 1024).await {
      Ok(log) => log,
      Err(err) => {
        warn!("failed to fetch job log: {err:#}");
        progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "could not fetch failure log");
        return;
      }
    };

    progress.update(&project_id, &ctx.branch, ProgressStage::Fixing, "applying runtime-failure repair", attempt);

    let registry = llm::registry::registry();
    let Some(provider_info) = registry.get_active_info() else {
      progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "no active llm provider");
      return;
    };
    let model = provider_info.active_model().to_string();
    let Ok(provider) = registry.instance(Some(&provider_info.id)) else {
      progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "llm provider unavailable");
      return;
    };

    let fixed = fixer::fix_from_job_log(
      provider.as_ref(),
      &model,
      artifacts.clone(),
      "build",
      &log_excerpt,
    )
    .await;
    provider.close().await;

    let Some(fixed_artifacts) = fixed else {
      progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "repair produced no usable changes");
      return;
    };

    progress.update(&project_id, &ctx.branch, ProgressStage::Committing, "committing repaired artifacts", attempt);

    // Pass the branch we're already watching as both the fork-from
    // branch and the write target, so a repair lands as a second
    // commit on that same branch instead of forking a fresh one.
    match committer::commit(
      &ctx.host,
      &ctx.owner,
      &ctx.repo,
      &ctx.branch,
      Some(ctx.branch.as_str()),
      &fixed_artifacts,
    )
    .await
    {
      Ok(_) => {
        artifacts = fixed_artifacts;
        info!("recommitted repaired artifacts on attempt {attempt} to branch {}", ctx.branch);
        progress.update(&project_id, &ctx.branch, ProgressStage::Monitoring, "re-monitoring after repair", attempt);
        continue 'outer;
      }
      Err(err) => {
        warn!("failed to commit repaired artifacts: {err:#}");
        progress.complete(&project_id, &ctx.branch, ProgressStage::Failure, "failed to commit repaired artifacts");
        return;
      }
    }
  }
}

/// Sleeps for `duration`, racing a cancellation notification. Returns
/// `true` if cancelled before the sleep elapsed.
async fn sleep_or_cancelled(duration: Duration, cancel: &tokio::sync::Notify) -> bool {
  tokio::select! {
    _ = tokio::time::sleep(duration) => false,
    _ = cancel.notified() => true,
  }
}

fn is_terminal(status: &str) -> bool {
  matches!(status, "success" | "failure" | "error" | "cancelled")
}

fn is_success(status: &str) -> bool {
  status == "success"
}
