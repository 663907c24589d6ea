use serde::{Deserialize, Serialize};

/// Metadata about a single LLM provider, as surfaced by the provider
/// registry. `active_model` overrides `default_model` once a caller
/// switches models at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMProviderInfo {
  pub id: String,
  pub name: String,
  pub description: String,
  pub available_models: Vec<String>,
  pub default_model: String,
  pub enabled: bool,
  pub active_model: Option<String>,
}

impl LLMProviderInfo {
  pub fn active_model(&self) -> &str {
    self.active_model.as_deref().unwrap_or(&self.default_model)
  }

  pub fn display_name(&self) -> String {
    format!("{} ({})", self.name, self.active_model())
  }
}
