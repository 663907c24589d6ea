//! Bearer-auth REST provider over a hosted chat-completions endpoint
//! (OpenAI-shaped). Grounded on the OpenAI integration this pipeline
//! was distilled from.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GenerateRequest, LlmProvider};
use crate::http_client;

pub struct RestHostedProvider {
  base_url: String,
  api_key: String,
}

impl RestHostedProvider {
  pub fn new(base_url: String, api_key: String) -> Self {
    RestHostedProvider { base_url: base_url.trim_end_matches('/').to_string(), api_key }
  }
}

#[async_trait]
impl LlmProvider for RestHostedProvider {
  async fn generate(&self, request: GenerateRequest<'_>) -> anyhow::Result<String> {
    let timeout = request.options.timeout.unwrap_or(Duration::from_secs(120));
    let client = http_client::client_with_timeout(timeout);

    let res = client
      .post(format!("{}/chat/completions", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&json!({
        "model": request.model,
        "temperature": request.options.temperature.unwrap_or(0.2),
        "max_tokens": request.options.max_tokens,
        "messages": [
          { "role": "system", "content": request.system },
          { "role": "user", "content": request.prompt },
        ],
      }))
      .send()
      .await
      .context("rest-hosted request failed")?
      .error_for_status()
      .context("rest-hosted returned error status")?
      .json::<Value>()
      .await
      .context("parsing rest-hosted response")?;

    res
      .get("choices")
      .and_then(Value::as_array)
      .and_then(|c| c.first())
      .and_then(|c| c.get("message"))
      .and_then(|m| m.get("content"))
      .and_then(Value::as_str)
      .map(str::to_string)
      .context("rest-hosted response missing choices[0].message.content")
  }
}
