//! Process-wide registry of LLM providers: metadata, enablement, and
//! the currently active provider/model. Switching is guarded by a
//! read-write lock; readers snapshot the active id without blocking
//! each other. Grounded on the LLM provider registry this pipeline was
//! distilled from.

use std::sync::{Arc, OnceLock, RwLock};

use anyhow::{Context, bail};
use forge_client::LLMProviderInfo;

use super::{LlmProvider, cli::CliWrappedProvider, local::LocalModelProvider, rest::RestHostedProvider};
use crate::config::Config;

pub struct LlmRegistry {
  providers: Vec<LLMProviderInfo>,
  active_id: RwLock<String>,
  config: Config,
}

impl LlmRegistry {
  pub fn new(config: Config) -> Self {
    let providers = vec![
      LLMProviderInfo {
        id: "local-model".into(),
        name: "Local Model".into(),
        description: "Local inference server (Ollama-shaped API)".into(),
        available_models: vec!["pipeline-generator-v5".into(), "llama3.1:70b".into()],
        default_model: "pipeline-generator-v5".into(),
        enabled: !config.local_model_base_url.is_empty(),
        active_model: None,
      },
      LLMProviderInfo {
        id: "cli-wrapped".into(),
        name: "CLI Provider".into(),
        description: "CLI-wrapped hosted model".into(),
        available_models: vec!["opus".into(), "sonnet".into(), "haiku".into()],
        default_model: "sonnet".into(),
        enabled: !config.cli_provider_bin.is_empty(),
        active_model: None,
      },
      LLMProviderInfo {
        id: "rest-hosted".into(),
        name: "REST Hosted".into(),
        description: "Hosted chat-completions REST API".into(),
        available_models: vec!["gpt-4".into(), "gpt-4-turbo".into()],
        default_model: "gpt-4".into(),
        enabled: !config.openai_api_key.is_empty(),
        active_model: None,
      },
    ];

    let active_id = config.llm_provider.clone();
    LlmRegistry { providers, active_id: RwLock::new(active_id), config }
  }

  pub fn list(&self) -> &[LLMProviderInfo] {
    &self.providers
  }

  pub fn get_active_id(&self) -> String {
    self.active_id.read().unwrap().clone()
  }

  pub fn get_active_info(&self) -> Option<&LLMProviderInfo> {
    let active = self.get_active_id();
    self.providers.iter().find(|p| p.id == active)
  }

  pub fn set_active(&self, provider_id: &str) -> anyhow::Result<()> {
    let provider = self
      .providers
      .iter()
      .find(|p| p.id == provider_id)
      .with_context(|| format!("unknown provider: {provider_id}"))?;
    if !provider.enabled {
      bail!("provider '{provider_id}' is not enabled (missing credentials or config)");
    }
    *self.active_id.write().unwrap() = provider_id.to_string();
    Ok(())
  }

  pub fn instance(&self, provider_id: Option<&str>) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let id = provider_id.map(str::to_string).unwrap_or_else(|| self.get_active_id());
    match id.as_str() {
      "cli-wrapped" => {
        Ok(Arc::new(CliWrappedProvider::new(self.config.cli_provider_bin.clone())))
      }
      "rest-hosted" => Ok(Arc::new(RestHostedProvider::new(
        "https://api.openai.com/v1".to_string(),
        self.config.openai_api_key.clone(),
      ))),
      _ => Ok(Arc::new(LocalModelProvider::new(self.config.local_model_base_url.clone()))),
    }
  }
}

static REGISTRY: OnceLock<LlmRegistry> = OnceLock::new();

pub fn init(config: Config) -> &'static LlmRegistry {
  REGISTRY.get_or_init(|| LlmRegistry::new(config))
}

pub fn registry() -> &'static LlmRegistry {
  REGISTRY.get().expect("llm registry not initialized")
}
