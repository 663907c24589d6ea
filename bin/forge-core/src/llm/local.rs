//! Local inference server provider (Ollama-shaped `/api/generate`).
//! Long timeout by default — local models on modest hardware can take
//! minutes for a full pipeline-generation prompt.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GenerateRequest, LlmProvider};
use crate::http_client;

pub struct LocalModelProvider {
  base_url: String,
}

impl LocalModelProvider {
  pub fn new(base_url: String) -> Self {
    LocalModelProvider { base_url: base_url.trim_end_matches('/').to_string() }
  }
}

#[async_trait]
impl LlmProvider for LocalModelProvider {
  async fn generate(&self, request: GenerateRequest<'_>) -> anyhow::Result<String> {
    let timeout = request.options.timeout.unwrap_or(Duration::from_secs(300));
    let client = http_client::client_with_timeout(timeout);

    let res = client
      .post(format!("{}/api/generate", self.base_url))
      .json(&json!({
        "model": request.model,
        "prompt": request.prompt,
        "system": request.system,
        "stream": false,
        "options": {
          "temperature": request.options.temperature.unwrap_or(0.2),
        },
      }))
      .send()
      .await
      .context("local model request failed")?
      .error_for_status()
      .context("local model returned error status")?
      .json::<Value>()
      .await
      .context("parsing local model response")?;

    res
      .get("response")
      .and_then(Value::as_str)
      .map(str::to_string)
      .context("local model response missing 'response' field")
  }
}
