pub mod defaults;
pub mod learning;
pub mod store;

use std::collections::HashMap;

use forge_client::{ArtifactSet, CollectionKind, RepoDescriptor, TargetPlatform};
use serde_json::{Value, json};
use tracing::instrument;

use self::store::DocumentStore;

/// Weight in `score = success_count * W - last_build_duration_seconds`.
/// A single successful build outweighs a ~5 minute faster one; tuned to
/// favor reliability over speed when ranking proven templates.
const SUCCESS_WEIGHT: f64 = 300.0;

pub struct TemplateStore {
  documents: DocumentStore,
}

pub struct RankedTemplate {
  pub artifacts_blob: String,
  pub score: f64,
}

impl TemplateStore {
  pub fn new(base_url: String, tenant: String, database: String) -> Self {
    TemplateStore { documents: DocumentStore::new(base_url, tenant, database) }
  }

  /// Serializes an artifact set into the fenced-code-block-per-file
  /// blob format this store persists documents as.
  pub fn encode(artifacts: &ArtifactSet) -> String {
    let mut out = String::new();
    for (name, content) in &artifacts.files {
      let lang = lang_tag(name);
      out.push_str(&format!("### {name}\n```{lang}\n{content}\n```\n\n"));
    }
    out
  }

  /// Re-splits a stored blob back into a filename -> content map. The
  /// inverse of [Self::encode].
  pub fn decode(blob: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut current_name: Option<String> = None;
    let mut current_body = String::new();
    let mut in_block = false;

    for line in blob.lines() {
      if let Some(name) = line.strip_prefix("### ") {
        current_name = Some(name.trim().to_string());
        continue;
      }
      if line.starts_with("```") {
        if in_block {
          if let Some(name) = current_name.take() {
            out.insert(name, current_body.trim_end_matches('\n').to_string());
          }
          current_body.clear();
        }
        in_block = !in_block;
        continue;
      }
      if in_block {
        current_body.push_str(line);
        current_body.push('\n');
      }
    }
    out
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn find_proven_template(
    &self,
    platform: TargetPlatform,
    analysis: &RepoDescriptor,
  ) -> anyhow::Result<Option<RankedTemplate>> {
    let collection = CollectionKind::SuccessfulArtifacts.collection_name(platform.as_str());

    let mut filters = vec![json!({ "language": analysis.language.to_string() })];
    if let Some(framework) = &analysis.framework {
      filters.push(json!({ "framework": framework }));
    }
    let where_filter = if filters.len() > 1 {
      json!({ "$and": filters })
    } else {
      filters.into_iter().next().unwrap_or(json!({}))
    };

    let mut docs = self.documents.get(&collection, where_filter).await?;
    if docs.is_empty() && analysis.framework.is_some() {
      // Fall back to language alone if the (language, framework) pair
      // has no proven record yet.
      docs = self
        .documents
        .get(&collection, json!({ "language": analysis.language.to_string() }))
        .await?;
    }

    Ok(
      docs
        .into_iter()
        .map(|d| {
          let success_count =
            d.metadata.get("success_count").and_then(Value::as_u64).unwrap_or(0);
          let duration =
            d.metadata.get("last_build_duration_seconds").and_then(Value::as_f64).unwrap_or(0.0);
          RankedTemplate {
            score: success_count as f64 * SUCCESS_WEIGHT - duration,
            artifacts_blob: d.document,
          }
        })
        .max_by(|a, b| a.score.total_cmp(&b.score)),
    )
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn find_reference_template(
    &self,
    platform: TargetPlatform,
    analysis: &RepoDescriptor,
  ) -> anyhow::Result<Option<String>> {
    let collection = CollectionKind::ReferenceTemplates.collection_name(platform.as_str());
    let docs = self
      .documents
      .get(&collection, json!({ "language": analysis.language.to_string() }))
      .await?;
    Ok(docs.into_iter().next().map(|d| d.document))
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn recent_feedback(
    &self,
    platform: TargetPlatform,
    analysis: &RepoDescriptor,
    limit: usize,
  ) -> anyhow::Result<Vec<String>> {
    let collection = CollectionKind::FeedbackEntries.collection_name(platform.as_str());
    let docs = self
      .documents
      .get(&collection, json!({ "language": analysis.language.to_string() }))
      .await?;
    Ok(docs.into_iter().take(limit).map(|d| d.document).collect())
  }

  pub fn documents(&self) -> &DocumentStore {
    &self.documents
  }
}

fn lang_tag(filename: &str) -> &'static str {
  if filename.ends_with(".yml") || filename.ends_with(".yaml") {
    "yaml"
  } else if filename.ends_with(".tf") {
    "hcl"
  } else if filename == "Jenkinsfile" {
    "groovy"
  } else {
    "dockerfile"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use forge_client::{HostKind, Language, PackageManager};

  fn descriptor() -> RepoDescriptor {
    RepoDescriptor {
      host: HostKind::GiteaStyle,
      owner: "acme".into(),
      repo: "widgets".into(),
      default_branch: "main".into(),
      language: Language::Python,
      framework: None,
      package_manager: PackageManager::Pip,
      file_list: vec![],
      has_artifacts: false,
    }
  }

  #[test]
  fn encode_decode_round_trips() {
    let mut artifacts = ArtifactSet::new(TargetPlatform::HostedPipeline, descriptor());
    artifacts.set("pipeline.yml", "stages:\n  - build\n");
    artifacts.set("container.build", "FROM python:3.12\n");

    let blob = TemplateStore::encode(&artifacts);
    let decoded = TemplateStore::decode(&blob);

    assert_eq!(decoded.get("pipeline.yml").unwrap(), "stages:\n  - build");
    assert_eq!(decoded.get("container.build").unwrap(), "FROM python:3.12");
  }
}
