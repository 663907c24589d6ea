//! Uniform LLM provider abstraction. Three backends share one trait;
//! a process-wide registry tracks which are enabled and which is
//! active, and switches take effect on the next call. Grounded on the
//! Ollama / Claude Code CLI / OpenAI integrations this pipeline was
//! distilled from.

pub mod cli;
pub mod local;
pub mod registry;
pub mod rest;

use std::{sync::OnceLock, time::Duration};

use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
  pub temperature: Option<f32>,
  pub max_tokens: Option<u32>,
  pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
  pub model: &'a str,
  pub prompt: &'a str,
  pub system: &'a str,
  pub options: GenerateOptions,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
  async fn generate(&self, request: GenerateRequest<'_>) -> anyhow::Result<String>;

  /// Releases any resource the provider held for this request cycle.
  /// A default no-op, since none of the three backends here keep a
  /// connection or subprocess open between calls; a future
  /// session-based backend (e.g. one that pins a CLI subprocess across
  /// turns) would override this to tear it down.
  async fn close(&self) {}
}

/// The cached system-prompt preamble, read once from disk and reused
/// for every request until the process restarts.
static SYSTEM_PROMPT: OnceLock<String> = OnceLock::new();

pub fn system_prompt() -> &'static str {
  SYSTEM_PROMPT.get_or_init(|| {
    let path = &crate::config::core_config().system_prompt_path;
    std::fs::read_to_string(path).unwrap_or_else(|_| {
      "You generate CI/CD pipeline and container build artifacts. \
       Respond using the requested file-marker format exactly."
        .to_string()
    })
  })
}
