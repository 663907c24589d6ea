//! Reinforcement-learning feedback loop on top of the document store:
//! successful artifact sets are deduplicated by content hash and
//! incremented in place; human corrections are appended as feedback
//! entries. Grounded on the Terraform learning-store this pipeline was
//! distilled from.

use std::collections::HashMap;

use forge_client::{ArtifactSet, CollectionKind, TargetPlatform};
use serde_json::{Value, json};
use tracing::instrument;

use super::TemplateStore;

#[instrument(level = "info", skip(store, artifacts))]
pub async fn record_success(
  store: &TemplateStore,
  platform: TargetPlatform,
  artifacts: &ArtifactSet,
  build_duration_seconds: f64,
) -> anyhow::Result<()> {
  let documents = store.documents();
  let collection = CollectionKind::SuccessfulArtifacts.collection_name(platform.as_str());
  let content_hash = artifacts.content_hash();
  let id = format!("{}-{content_hash}", platform.as_str());

  let existing = documents
    .get(&collection, json!({ "content_hash": content_hash.clone() }))
    .await?;

  if let Some(existing) = existing.into_iter().next() {
    let success_count =
      existing.metadata.get("success_count").and_then(Value::as_u64).unwrap_or(0) + 1;
    let mut metadata = existing.metadata;
    metadata.insert("success_count".into(), json!(success_count));
    metadata.insert("last_build_duration_seconds".into(), json!(build_duration_seconds));
    documents.update_metadata(&collection, &existing.id, metadata).await?;
    return Ok(());
  }

  let metadata = success_metadata(platform, artifacts, &content_hash, build_duration_seconds);
  let blob = TemplateStore::encode(artifacts);
  documents.add(&collection, &id, &blob, metadata).await
}

#[instrument(level = "info", skip(store, before, after))]
pub async fn record_feedback(
  store: &TemplateStore,
  platform: TargetPlatform,
  language: &str,
  error_class: &str,
  description: &str,
  before: &str,
  after: &str,
) -> anyhow::Result<()> {
  let documents = store.documents();
  let collection = CollectionKind::FeedbackEntries.collection_name(platform.as_str());
  let id = format!("{}-{}", platform.as_str(), forge_client::forge_timestamp());

  let mut metadata = HashMap::new();
  metadata.insert("language".into(), json!(language));
  metadata.insert("error_class".into(), json!(error_class));
  metadata.insert("description".into(), json!(description));

  let document = format!(
    "### before\n```\n{before}\n```\n\n### after\n```\n{after}\n```\n"
  );
  documents.add(&collection, &id, &document, metadata).await
}

fn success_metadata(
  platform: TargetPlatform,
  artifacts: &ArtifactSet,
  content_hash: &str,
  build_duration_seconds: f64,
) -> HashMap<String, Value> {
  let mut metadata = HashMap::new();
  metadata.insert("collection_kind".into(), json!("successful-artifacts"));
  metadata.insert("platform".into(), json!(platform.as_str()));
  metadata.insert("language".into(), json!(artifacts.analysis.language.to_string()));
  if let Some(framework) = &artifacts.analysis.framework {
    metadata.insert("framework".into(), json!(framework));
  }
  metadata.insert("content_hash".into(), json!(content_hash));
  metadata.insert("success_count".into(), json!(1));
  metadata.insert("last_build_duration_seconds".into(), json!(build_duration_seconds));
  metadata
}
