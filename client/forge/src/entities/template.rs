use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
  ReferenceTemplates,
  SuccessfulArtifacts,
  FeedbackEntries,
}

impl CollectionKind {
  pub fn collection_name(&self, platform: &str) -> String {
    let suffix = match self {
      CollectionKind::ReferenceTemplates => "reference",
      CollectionKind::SuccessfulArtifacts => "successful",
      CollectionKind::FeedbackEntries => "feedback",
    };
    format!("forge-{platform}-{suffix}")
  }
}

/// A record stored in (or retrieved from) the vector/document store.
/// `document` holds the fenced-code-block-per-file blob; `metadata`
/// carries everything the template store filters and ranks on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
  pub id: String,
  pub document: String,
  pub metadata: HashMap<String, Value>,
}

impl TemplateRecord {
  pub fn success_count(&self) -> u64 {
    self
      .metadata
      .get("success_count")
      .and_then(Value::as_u64)
      .unwrap_or(0)
  }

  pub fn last_build_duration_seconds(&self) -> f64 {
    self
      .metadata
      .get("last_build_duration_seconds")
      .and_then(Value::as_f64)
      .unwrap_or(0.0)
  }

  /// `score = success_count * W - last_build_duration_seconds`.
  pub fn score(&self, weight: f64) -> f64 {
    self.success_count() as f64 * weight - self.last_build_duration_seconds()
  }
}
