//! In-memory progress store: one `PipelineProgress` per project,
//! updated by the monitor at every state transition and polled by
//! callers wanting to watch a generation run. Bounded by an eviction
//! cap so a long-running core never accumulates unbounded history from
//! abandoned or forgotten projects. Grounded on the teacher's
//! in-memory state cache pattern (a `RwLock`-guarded map behind a
//! handful of narrow accessor methods) rather than its schedule/alert
//! history, which persists to a database this pipeline has none of.

use std::{collections::HashMap, sync::RwLock};

use forge_client::{PipelineProgress, ProgressEvent, ProgressStage};

use crate::config::core_config;

pub struct ProgressStore {
  entries: RwLock<HashMap<String, PipelineProgress>>,
}

impl ProgressStore {
  pub fn new() -> Self {
    ProgressStore { entries: RwLock::new(HashMap::new()) }
  }

  /// Starts tracking a new run, evicting the oldest completed entry
  /// first if the store is at capacity.
  pub fn create(&self, project_id: String, branch: String, max_attempts: u32) {
    let mut entries = self.entries.write().expect("progress store lock poisoned");
    let cap = core_config().max_progress_events as usize;
    if entries.len() >= cap {
      evict_oldest_completed(&mut entries);
    }
    entries.insert(project_id.clone(), PipelineProgress::new(project_id, branch, max_attempts));
  }

  pub fn update(
    &self,
    project_id: &str,
    branch: &str,
    stage: ProgressStage,
    message: impl Into<String>,
    attempt: u32,
  ) {
    let mut entries = self.entries.write().expect("progress store lock poisoned");
    let Some(progress) = entries.get_mut(project_id) else { return };
    let message = message.into();
    progress.branch = branch.to_string();
    progress.stage = stage;
    progress.current_message = message.clone();
    progress.attempt = attempt;
    progress.completed = stage.is_terminal();
    progress.events.push(ProgressEvent {
      timestamp: forge_client::forge_timestamp(),
      stage,
      message,
      attempt,
      max_attempts: progress.max_attempts,
    });
  }

  pub fn complete(
    &self,
    project_id: &str,
    branch: &str,
    stage: ProgressStage,
    message: impl Into<String>,
  ) {
    let attempt = self.get(project_id).map(|p| p.attempt).unwrap_or(0);
    self.update(project_id, branch, stage, message, attempt);
  }

  pub fn get(&self, project_id: &str) -> Option<PipelineProgress> {
    self.entries.read().expect("progress store lock poisoned").get(project_id).cloned()
  }

  pub fn len(&self) -> usize {
    self.entries.read().expect("progress store lock poisoned").len()
  }
}

impl Default for ProgressStore {
  fn default() -> Self {
    Self::new()
  }
}

fn evict_oldest_completed(entries: &mut HashMap<String, PipelineProgress>) {
  let oldest = entries
    .iter()
    .filter(|(_, p)| p.completed)
    .min_by_key(|(_, p)| p.events.first().map(|e| e.timestamp).unwrap_or(i64::MAX))
    .map(|(id, _)| id.clone());

  if let Some(id) = oldest {
    entries.remove(&id);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tracks_transitions_and_terminal_state() {
    let store = ProgressStore::new();
    store.create("acme/widgets".into(), "main".into(), 3);
    store.update("acme/widgets", "main", ProgressStage::Running, "running", 0);
    assert!(!store.get("acme/widgets").unwrap().completed);

    store.complete("acme/widgets", "main", ProgressStage::Success, "done");
    let progress = store.get("acme/widgets").unwrap();
    assert!(progress.completed);
    assert_eq!(progress.events.len(), 3);
  }

  #[test]
  fn branch_rename_is_reflected_under_the_same_project_id() {
    let store = ProgressStore::new();
    store.create("acme/widgets".into(), "main".into(), 3);
    store.update("acme/widgets", "forge/123", ProgressStage::Monitoring, "re-monitoring", 1);
    assert_eq!(store.get("acme/widgets").unwrap().branch, "forge/123");
  }
}
