use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{RepoDescriptor, TargetPlatform};

/// Provenance tag attached to every generator response. `Template`
/// carries the reference template id it came from so callers can tell
/// a proven hit from a cold default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
  ProvenTemplate,
  Llm { provider: String, model: String },
  DefaultTemplate,
}

impl std::fmt::Display for Provenance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Provenance::ProvenTemplate => write!(f, "proven-template"),
      Provenance::Llm { provider, model } => {
        write!(f, "llm:{provider}:{model}")
      }
      Provenance::DefaultTemplate => write!(f, "default-template"),
    }
  }
}

/// An ordered mapping from artifact filename (e.g. `pipeline.yml`,
/// `container.build`) to its text content, plus the analysis it was
/// generated from. Insertion order is preserved so stored documents and
/// commit order are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSet {
  pub platform: TargetPlatform,
  pub files: IndexMap<String, String>,
  pub analysis: RepoDescriptor,
}

impl ArtifactSet {
  pub fn new(platform: TargetPlatform, analysis: RepoDescriptor) -> Self {
    ArtifactSet { platform, files: IndexMap::new(), analysis }
  }

  pub fn set(&mut self, name: impl Into<String>, content: impl Into<String>) {
    self.files.insert(name.into(), content.into());
  }

  /// Stable content hash used by the learning store to dedupe
  /// successful artifact sets. Hashes filenames and contents together,
  /// in insertion order, so reordering never changes the digest for the
  /// same set of files sorted the same way.
  pub fn content_hash(&self) -> String {
    let mut hasher = Sha256::new();
    for (name, content) in &self.files {
      hasher.update(name.as_bytes());
      hasher.update([0u8]);
      hasher.update(content.as_bytes());
      hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
  }

  pub fn is_empty(&self) -> bool {
    self.files.values().all(|v| v.trim().is_empty())
  }
}
