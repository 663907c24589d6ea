//! Shared entity types for the generator / validator / fixer / monitor
//! pipeline. Mirrors the way `komodo_client` centralizes wire types for
//! every binary in that workspace: one crate, no business logic, just
//! the shapes that cross module and process boundaries.

pub mod entities;
pub mod error;

pub use entities::*;
pub use error::CoreError;

/// Millisecond unix timestamp, used everywhere a `Log` or `ProgressEvent`
/// needs `start_ts` / `end_ts` / ordering.
pub fn forge_timestamp() -> i64 {
  chrono::Utc::now().timestamp_millis()
}
