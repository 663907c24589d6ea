use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
  Monitoring,
  Running,
  Diagnosing,
  Fixing,
  Committing,
  Success,
  Failure,
}

impl ProgressStage {
  pub fn is_terminal(&self) -> bool {
    matches!(self, ProgressStage::Success | ProgressStage::Failure)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
  pub timestamp: i64,
  pub stage: ProgressStage,
  pub message: String,
  pub attempt: u32,
  pub max_attempts: u32,
}

/// One supervisor's view of a `(project_id, branch)` pair. The event
/// log is append-only and bounded by the progress store that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineProgress {
  pub project_id: String,
  pub branch: String,
  pub stage: ProgressStage,
  pub current_message: String,
  pub attempt: u32,
  pub max_attempts: u32,
  pub build_id: Option<String>,
  pub completed: bool,
  pub events: Vec<ProgressEvent>,
}

impl PipelineProgress {
  pub fn new(project_id: String, branch: String, max_attempts: u32) -> Self {
    PipelineProgress {
      project_id,
      branch,
      stage: ProgressStage::Monitoring,
      current_message: String::new(),
      attempt: 0,
      max_attempts,
      build_id: None,
      completed: false,
      events: Vec::new(),
    }
  }
}
