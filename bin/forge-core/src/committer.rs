//! Commits a generated artifact set to the source repository. On the
//! first commit for a project, mints a timestamped branch from the
//! default branch; on a repair commit, `target_branch` names the
//! branch the supervisor is already watching, and the commit lands
//! there instead — the build host sees a second commit on the same
//! branch, not a new one. A partial-commit failure leaves the branch
//! consistent up to the last successfully written file — it never
//! rolls back prior writes.

use forge_client::{ArtifactSet, CoreError};
use tracing::instrument;

use crate::host_client::HostClient;

pub struct CommitResult {
  pub branch: String,
  pub written_files: Vec<String>,
}

#[instrument(level = "info", skip(host, artifacts))]
pub async fn commit(
  host: &HostClient,
  owner: &str,
  repo: &str,
  default_branch: &str,
  target_branch: Option<&str>,
  artifacts: &ArtifactSet,
) -> anyhow::Result<CommitResult> {
  let branch = match target_branch {
    Some(existing) => existing.to_string(),
    None => format!("forge/{}", forge_client::forge_timestamp()),
  };

  host.create_branch(owner, repo, &branch, default_branch).await?;

  let mut written = Vec::with_capacity(artifacts.files.len());
  for (path, content) in &artifacts.files {
    match host
      .upsert_file(
        owner,
        repo,
        path,
        &branch,
        content,
        "forge: generate pipeline artifacts",
      )
      .await
    {
      Ok(()) => written.push(path.clone()),
      Err(err) => {
        return Err(
          CoreError::CommitPartial {
            written: written.len(),
            total: artifacts.files.len(),
            reason: format!("{err:#}"),
          }
          .into(),
        );
      }
    }
  }

  Ok(CommitResult { branch, written_files: written })
}
