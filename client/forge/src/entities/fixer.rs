use serde::{Deserialize, Serialize};

use super::ValidationReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixAttemptRecord {
  pub attempt_index: u32,
  pub report: ValidationReport,
  pub applied: bool,
}

/// Ordered, append-only within one request. Discarded once the request
/// completes — it is never persisted beyond the generator's response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixHistory {
  pub attempts: Vec<FixAttemptRecord>,
}

impl FixHistory {
  pub fn push(&mut self, record: FixAttemptRecord) {
    debug_assert!(
      self
        .attempts
        .last()
        .is_none_or(|last| record.attempt_index > last.attempt_index),
      "fix attempt indices must increase monotonically"
    );
    self.attempts.push(record);
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixOutcome {
  Fixed,
  Exhausted,
}
