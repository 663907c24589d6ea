//! Scratch-directory lifecycle for the infra target: each generation
//! request that needs a local checkout (to run `terraform validate`-style
//! tooling, see the variables validator) gets a UUID-identified directory
//! under the configured workspace root, swept away once its TTL elapses.
//! Grounded on the teacher's periodic background-task spawn pattern
//! (a `tokio::spawn` loop sleeping on a fixed interval).

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::core_config;

/// Creates a fresh scratch directory under the workspace root and
/// returns its path. Callers are responsible for populating it; the
/// sweeper reclaims it once its TTL elapses, whether or not the caller
/// ever cleaned up after itself.
#[instrument(level = "debug")]
pub async fn create() -> anyhow::Result<PathBuf> {
  let root = Path::new(&core_config().workspace_root);
  fs::create_dir_all(root).await?;
  let dir = root.join(Uuid::new_v4().to_string());
  fs::create_dir(&dir).await?;
  Ok(dir)
}

/// Removes `dir` immediately. Callers that finish cleanly should call
/// this rather than waiting for the sweeper.
#[instrument(level = "debug")]
pub async fn remove(dir: &Path) -> anyhow::Result<()> {
  if fs::try_exists(dir).await? {
    fs::remove_dir_all(dir).await?;
  }
  Ok(())
}

/// Spawns the background sweep loop: every `sweep_interval_secs`,
/// removes workspace subdirectories whose modification time is older
/// than `ttl_secs`. Runs for the lifetime of the process.
pub fn spawn_sweeper() {
  tokio::spawn(async move {
    let cfg = core_config();
    let interval = Duration::from_secs(cfg.workspace_sweep_interval_secs);
    loop {
      tokio::time::sleep(interval).await;
      if let Err(err) = sweep_once().await {
        warn!("workspace sweep failed: {err:#}");
      }
    }
  });
}

#[instrument(level = "debug")]
async fn sweep_once() -> anyhow::Result<()> {
  let cfg = core_config();
  let root = Path::new(&cfg.workspace_root);
  if !fs::try_exists(root).await? {
    return Ok(());
  }

  let ttl = Duration::from_secs(cfg.workspace_ttl_secs);
  let now = std::time::SystemTime::now();
  let mut entries = fs::read_dir(root).await?;

  while let Some(entry) = entries.next_entry().await? {
    let metadata = match entry.metadata().await {
      Ok(metadata) => metadata,
      Err(err) => {
        warn!("could not stat workspace entry {:?}: {err:#}", entry.path());
        continue;
      }
    };
    if !metadata.is_dir() {
      continue;
    }
    let age = match metadata.modified().and_then(|modified| {
      now.duration_since(modified).map_err(|e| std::io::Error::other(e.to_string()))
    }) {
      Ok(age) => age,
      Err(_) => continue,
    };
    if age > ttl {
      if let Err(err) = fs::remove_dir_all(entry.path()).await {
        warn!("failed to sweep expired workspace {:?}: {err:#}", entry.path());
      }
    }
  }

  Ok(())
}
