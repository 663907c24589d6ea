use thiserror::Error;

/// Taxonomy of terminal failure kinds surfaced at the crate boundary.
/// Internal plumbing uses `anyhow::Result` throughout; this enum exists
/// only where a caller needs to match on *why* a request failed.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("input invalid: {0}")]
  InputInvalid(String),

  #[error("upstream unavailable: {system}: {source}")]
  UpstreamUnavailable {
    system: &'static str,
    #[source]
    source: anyhow::Error,
  },

  #[error("validation fatal: {0}")]
  ValidationFatal(String),

  #[error("policy violation: {0}")]
  PolicyViolation(String),

  #[error("commit partial: wrote {written} of {total} files: {reason}")]
  CommitPartial {
    written: usize,
    total: usize,
    reason: String,
  },

  #[error(
    "supervisor exhausted after {attempts} attempts without a successful build"
  )]
  SupervisorExhausted { attempts: u32 },
}
