use serde::{Deserialize, Serialize};

/// Captured output of a subprocess invocation: an image copy, an
/// infra-tool call, or a CLI-wrapped LLM provider. Mirrors the shape
/// every subprocess wrapper in this codebase converges on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Log {
  pub stage: String,
  pub command: String,
  pub stdout: String,
  pub stderr: String,
  pub success: bool,
  pub start_ts: i64,
  pub end_ts: i64,
}
