//! Document-store client (ChromaDB v2-shaped REST API): tenant/database
//! scoped collections, name -> UUID resolution (cached for the process
//! lifetime, since the wire API has no get-by-name endpoint), and
//! document CRUD with metadata `where` filters. Grounded on the
//! ChromaDB integration this pipeline was distilled from.

use std::{collections::HashMap, sync::RwLock};

use anyhow::Context;
use serde_json::{Value, json};
use sha2::{Digest, Sha384};
use tracing::instrument;

use crate::http_client;

pub struct DocumentStore {
  base_url: String,
  tenant: String,
  database: String,
  collection_ids: RwLock<HashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
  pub id: String,
  pub document: String,
  pub metadata: HashMap<String, Value>,
}

impl DocumentStore {
  pub fn new(base_url: String, tenant: String, database: String) -> Self {
    DocumentStore {
      base_url: base_url.trim_end_matches('/').to_string(),
      tenant,
      database,
      collection_ids: RwLock::new(HashMap::new()),
    }
  }

  fn tenant_db_path(&self) -> String {
    format!(
      "{}/api/v2/tenants/{}/databases/{}",
      self.base_url, self.tenant, self.database
    )
  }

  /// Resolves (and caches) the opaque collection id for `name`,
  /// creating the collection if it doesn't exist yet.
  #[instrument(level = "debug", skip(self))]
  async fn collection_id(&self, name: &str) -> anyhow::Result<String> {
    if let Some(id) = self.collection_ids.read().unwrap().get(name) {
      return Ok(id.clone());
    }

    let url = format!("{}/collections", self.tenant_db_path());
    let res = http_client::client()
      .post(&url)
      .json(&json!({ "name": name, "get_or_create": true }))
      .send()
      .await
      .context("creating/resolving collection")?
      .error_for_status()
      .context("collection resolve request failed")?
      .json::<Value>()
      .await
      .context("parsing collection response")?;

    let id = res
      .get("id")
      .and_then(Value::as_str)
      .context("collection response missing id")?
      .to_string();

    self
      .collection_ids
      .write()
      .unwrap()
      .insert(name.to_string(), id.clone());
    Ok(id)
  }

  #[instrument(level = "debug", skip(self, document, metadata))]
  pub async fn add(
    &self,
    collection: &str,
    id: &str,
    document: &str,
    metadata: HashMap<String, Value>,
  ) -> anyhow::Result<()> {
    let collection_id = self.collection_id(collection).await?;
    let url =
      format!("{}/collections/{collection_id}/add", self.tenant_db_path());

    http_client::client()
      .post(&url)
      .json(&json!({
        "ids": [id],
        "documents": [document],
        "metadatas": [metadata],
        "embeddings": [pseudo_embedding(document)],
      }))
      .send()
      .await
      .context("adding document")?
      .error_for_status()
      .context("add document request failed")?;
    Ok(())
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn update_metadata(
    &self,
    collection: &str,
    id: &str,
    metadata: HashMap<String, Value>,
  ) -> anyhow::Result<()> {
    let collection_id = self.collection_id(collection).await?;
    let url = format!(
      "{}/collections/{collection_id}/update",
      self.tenant_db_path()
    );

    http_client::client()
      .post(&url)
      .json(&json!({ "ids": [id], "metadatas": [metadata] }))
      .send()
      .await
      .context("updating document metadata")?
      .error_for_status()
      .context("update request failed")?;
    Ok(())
  }

  /// Retrieves every document matching `where_filter` (an exact-match
  /// or `$and` conjunction object). Semantic similarity is not used —
  /// this store is a metadata-filtered key/value cache.
  #[instrument(level = "debug", skip(self, where_filter))]
  pub async fn get(
    &self,
    collection: &str,
    where_filter: Value,
  ) -> anyhow::Result<Vec<StoredDocument>> {
    let collection_id = self.collection_id(collection).await?;
    let url =
      format!("{}/collections/{collection_id}/get", self.tenant_db_path());

    let res = http_client::client()
      .post(&url)
      .json(&json!({
        "where": where_filter,
        "include": ["documents", "metadatas"],
      }))
      .send()
      .await
      .context("querying documents")?
      .error_for_status()
      .context("get request failed")?
      .json::<Value>()
      .await
      .context("parsing get response")?;

    parse_get_response(res)
  }
}

fn parse_get_response(res: Value) -> anyhow::Result<Vec<StoredDocument>> {
  let ids = res.get("ids").and_then(Value::as_array).cloned().unwrap_or_default();
  let documents = res.get("documents").and_then(Value::as_array).cloned().unwrap_or_default();
  let metadatas = res.get("metadatas").and_then(Value::as_array).cloned().unwrap_or_default();

  let mut out = Vec::with_capacity(ids.len());
  for i in 0..ids.len() {
    let id = ids[i].as_str().unwrap_or_default().to_string();
    let document = documents.get(i).and_then(Value::as_str).unwrap_or_default().to_string();
    let metadata = metadatas
      .get(i)
      .and_then(Value::as_object)
      .map(|m| m.clone().into_iter().collect())
      .unwrap_or_default();
    out.push(StoredDocument { id, document, metadata });
  }
  Ok(out)
}

/// Deterministic pseudo-embedding for documents that have no real
/// embedding: SHA-384 the document, map each byte to `[0, 1]`. Used
/// only to satisfy a document-store API that rejects writes without a
/// vector — correctness never depends on these being meaningful
/// embeddings, since retrieval is driven entirely by metadata filters.
pub fn pseudo_embedding(document: &str) -> Vec<f32> {
  let digest = Sha384::digest(document.as_bytes());
  digest.iter().map(|b| *b as f32 / 255.0).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pseudo_embedding_is_deterministic_and_bounded() {
    let a = pseudo_embedding("hello world");
    let b = pseudo_embedding("hello world");
    assert_eq!(a, b);
    assert_eq!(a.len(), 48);
    assert!(a.iter().all(|v| (0.0..=1.0).contains(v)));
  }

  #[test]
  fn pseudo_embedding_differs_by_content() {
    assert_ne!(pseudo_embedding("a"), pseudo_embedding("b"));
  }
}
