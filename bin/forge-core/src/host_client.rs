//! Repository host dispatch: one client type, matching on `HostKind`
//! rather than a trait-object hierarchy — the same tagged-variant
//! dispatch the teacher uses for its resource targets. Gitea-flavored
//! operations are grounded on the Gitea API v1 committer this pipeline
//! was distilled from; the GitHub-style branch reuses the same shapes
//! (both are "create ref, upsert contents, list runs" APIs).

use anyhow::{Context, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use forge_client::HostKind;
use serde_json::{Value, json};

use crate::http_client;

#[derive(Debug, Clone)]
pub struct HostClient {
  kind: HostKind,
  base_url: String,
  token: String,
}

#[derive(Debug, Clone)]
pub struct BuildSummary {
  pub id: String,
  pub status: String,
  pub branch: String,
}

impl HostClient {
  pub fn new(kind: HostKind, base_url: String, token: String) -> Self {
    HostClient { kind, base_url: base_url.trim_end_matches('/').to_string(), token }
  }

  pub fn kind(&self) -> HostKind {
    self.kind
  }

  fn api_root(&self) -> String {
    match self.kind {
      HostKind::GiteaStyle => format!("{}/api/v1", self.base_url),
      HostKind::GithubStyle => format!("{}/api/v3", self.base_url),
    }
  }

  fn auth_header(&self) -> (&'static str, String) {
    match self.kind {
      HostKind::GiteaStyle => ("Authorization", format!("token {}", self.token)),
      HostKind::GithubStyle => ("Authorization", format!("Bearer {}", self.token)),
    }
  }

  pub async fn default_branch(
    &self,
    owner: &str,
    repo: &str,
  ) -> anyhow::Result<String> {
    let url = format!("{}/repos/{owner}/{repo}", self.api_root());
    let (header, value) = self.auth_header();
    let res = http_client::client()
      .get(&url)
      .header(header, value)
      .send()
      .await
      .context("fetching repo metadata")?
      .error_for_status()
      .context("repo metadata request failed")?
      .json::<Value>()
      .await
      .context("parsing repo metadata")?;

    Ok(
      res
        .get("default_branch")
        .and_then(Value::as_str)
        .unwrap_or("main")
        .to_string(),
    )
  }

  pub async fn list_root(
    &self,
    owner: &str,
    repo: &str,
    branch: &str,
  ) -> anyhow::Result<Vec<String>> {
    let url = format!(
      "{}/repos/{owner}/{repo}/contents?ref={branch}",
      self.api_root()
    );
    let (header, value) = self.auth_header();
    let res = http_client::client()
      .get(&url)
      .header(header, value)
      .send()
      .await
      .context("listing repo root")?
      .error_for_status()
      .context("list root request failed")?
      .json::<Vec<Value>>()
      .await
      .context("parsing root listing")?;

    Ok(
      res
        .into_iter()
        .filter_map(|entry| entry.get("name").and_then(Value::as_str).map(String::from))
        .collect(),
    )
  }

  /// Returns `(content, sha)` if the file exists on `branch`, `None`
  /// if it doesn't — a 404 here is an expected outcome, not an error.
  async fn get_file(
    &self,
    owner: &str,
    repo: &str,
    path: &str,
    branch: &str,
  ) -> anyhow::Result<Option<(String, String)>> {
    let url = format!(
      "{}/repos/{owner}/{repo}/contents/{path}?ref={branch}",
      self.api_root()
    );
    let (header, value) = self.auth_header();
    let res = http_client::client()
      .get(&url)
      .header(header, value)
      .send()
      .await
      .context("probing file")?;

    if res.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let res = res.error_for_status().context("probe file request failed")?;
    let body: Value = res.json().await.context("parsing file probe response")?;
    let sha = body.get("sha").and_then(Value::as_str).unwrap_or_default().to_string();
    let content = body.get("content").and_then(Value::as_str).unwrap_or_default().to_string();
    Ok(Some((content, sha)))
  }

  /// Creates `branch` from `from_branch`. Already-exists is tolerated
  /// and treated as success — the branch is simply reused.
  pub async fn create_branch(
    &self,
    owner: &str,
    repo: &str,
    branch: &str,
    from_branch: &str,
  ) -> anyhow::Result<()> {
    let url = format!("{}/repos/{owner}/{repo}/branches", self.api_root());
    let (header, value) = self.auth_header();
    let res = http_client::client()
      .post(&url)
      .header(header, value)
      .json(&json!({ "new_branch_name": branch, "old_branch_name": from_branch }))
      .send()
      .await
      .context("creating branch")?;

    if res.status().is_success() || res.status() == reqwest::StatusCode::CONFLICT {
      return Ok(());
    }
    bail!("create branch failed: {}", res.status())
  }

  /// Creates or updates a single file on `branch`. Probes for an
  /// existing blob sha first; omits it on create, supplies it on
  /// update, matching the host API's idempotency contract.
  pub async fn upsert_file(
    &self,
    owner: &str,
    repo: &str,
    path: &str,
    branch: &str,
    content: &str,
    message: &str,
  ) -> anyhow::Result<()> {
    let existing = self.get_file(owner, repo, path, branch).await?;
    let encoded = STANDARD.encode(content);

    let url = format!("{}/repos/{owner}/{repo}/contents/{path}", self.api_root());
    let (header, value) = self.auth_header();
    let mut body = json!({
      "content": encoded,
      "message": message,
      "branch": branch,
    });

    let request = if let Some((_, sha)) = existing {
      body["sha"] = json!(sha);
      http_client::client().put(&url)
    } else {
      http_client::client().post(&url)
    };

    let res = request
      .header(header, value)
      .json(&body)
      .send()
      .await
      .context("upserting file")?;

    if !res.status().is_success() {
      bail!("upsert {path} failed: {}", res.status());
    }
    Ok(())
  }

  pub async fn list_builds(
    &self,
    owner: &str,
    repo: &str,
    branch: &str,
  ) -> anyhow::Result<Vec<BuildSummary>> {
    let url = format!(
      "{}/repos/{owner}/{repo}/actions/tasks?ref={branch}",
      self.api_root()
    );
    let (header, value) = self.auth_header();
    let res = http_client::client()
      .get(&url)
      .header(header, value)
      .send()
      .await
      .context("listing builds")?
      .error_for_status()
      .context("list builds request failed")?
      .json::<Value>()
      .await
      .context("parsing build list")?;

    let entries = res
      .get("workflow_runs")
      .or_else(|| res.as_array().map(|_| &res))
      .cloned()
      .unwrap_or(Value::Array(vec![]));

    let runs = entries.as_array().cloned().unwrap_or_default();
    Ok(
      runs
        .into_iter()
        .filter_map(|r| {
          Some(BuildSummary {
            id: r.get("id")?.to_string(),
            status: r.get("status").and_then(Value::as_str)?.to_string(),
            branch: branch.to_string(),
          })
        })
        .collect(),
    )
  }

  pub async fn get_job_log(
    &self,
    owner: &str,
    repo: &str,
    build_id: &str,
    max_bytes: usize,
  ) -> anyhow::Result<String> {
    let url = format!(
      "{}/repos/{owner}/{repo}/actions/tasks/{build_id}/logs",
      self.api_root()
    );
    let (header, value) = self.auth_header();
    let res = http_client::client()
      .get(&url)
      .header(header, value)
      .send()
      .await
      .context("fetching job log")?
      .error_for_status()
      .context("job log request failed")?
      .text()
      .await
      .context("reading job log body")?;

    let bytes = res.as_bytes();
    let tail = if bytes.len() > max_bytes {
      String::from_utf8_lossy(&bytes[bytes.len() - max_bytes..]).into_owned()
    } else {
      res
    };
    Ok(tail)
  }
}
