use std::sync::OnceLock;

use logger::{LogConfig, LogLevel, StdioLogMode};
use serde::Deserialize;

/// Process-level configuration, assembled once from environment
/// variables. This intentionally does not reproduce the teacher's
/// multi-file merge/include config loader — static configuration
/// loading is out of scope here, the core only consumes an
/// already-assembled value.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default = "default_bind_port")]
  pub port: u16,

  #[serde(default)]
  pub log_level: String,
  #[serde(default)]
  pub log_stdio: String,
  #[serde(default)]
  pub log_pretty: bool,
  #[serde(default)]
  pub otlp_endpoint: String,

  #[serde(default = "default_host_base_url")]
  pub host_base_url: String,
  #[serde(default)]
  pub host_token: String,
  #[serde(default = "default_host_kind")]
  pub host_kind: String,

  #[serde(default = "default_registry_base_url")]
  pub registry_base_url: String,
  #[serde(default)]
  pub registry_user: String,
  #[serde(default)]
  pub registry_pass: String,
  #[serde(default = "default_registry_host")]
  pub registry_host: String,

  /// Pipeline-service lint endpoint. Empty disables the check — remote
  /// lint is best-effort, not every deployment has one wired up.
  #[serde(default)]
  pub pipeline_service_lint_url: String,

  #[serde(default = "default_store_base_url")]
  pub store_base_url: String,
  #[serde(default = "default_store_tenant")]
  pub store_tenant: String,
  #[serde(default = "default_store_database")]
  pub store_database: String,

  #[serde(default = "default_llm_provider")]
  pub llm_provider: String,
  #[serde(default)]
  pub openai_api_key: String,
  #[serde(default)]
  pub local_model_base_url: String,
  #[serde(default = "default_cli_provider_bin")]
  pub cli_provider_bin: String,
  #[serde(default = "default_system_prompt_path")]
  pub system_prompt_path: String,

  #[serde(default = "default_max_fix_attempts")]
  pub max_fix_attempts: u32,
  #[serde(default = "default_monitor_poll_secs")]
  pub monitor_poll_secs: u64,
  #[serde(default = "default_monitor_discovery_timeout_secs")]
  pub monitor_discovery_timeout_secs: u64,
  #[serde(default = "default_max_progress_events")]
  pub max_progress_events: usize,

  #[serde(default = "default_workspace_root")]
  pub workspace_root: String,
  #[serde(default = "default_workspace_ttl_secs")]
  pub workspace_ttl_secs: u64,
  #[serde(default = "default_workspace_sweep_interval_secs")]
  pub workspace_sweep_interval_secs: u64,
}

fn default_bind_port() -> u16 { 9420 }
fn default_host_base_url() -> String { "http://localhost:3000".into() }
fn default_host_kind() -> String { "gitea".into() }
fn default_registry_base_url() -> String { "http://localhost:8081".into() }
fn default_registry_host() -> String { "localhost:8081".into() }
fn default_store_base_url() -> String { "http://localhost:8000".into() }
fn default_store_tenant() -> String { "default_tenant".into() }
fn default_store_database() -> String { "default_database".into() }
fn default_llm_provider() -> String { "local-model".into() }
fn default_cli_provider_bin() -> String { "llm-cli".into() }
fn default_system_prompt_path() -> String { "/etc/forge/system_prompt.txt".into() }
fn default_max_fix_attempts() -> u32 { 10 }
fn default_monitor_poll_secs() -> u64 { 10 }
fn default_monitor_discovery_timeout_secs() -> u64 { 300 }
fn default_max_progress_events() -> usize { 200 }
fn default_workspace_root() -> String { "/tmp/forge-workspaces".into() }
fn default_workspace_ttl_secs() -> u64 { 2 * 60 * 60 }
fn default_workspace_sweep_interval_secs() -> u64 { 10 * 60 }

impl Config {
  pub fn log_config(&self) -> LogConfig {
    LogConfig {
      level: match self.log_level.as_str() {
        "error" => LogLevel::Error,
        "warn" => LogLevel::Warn,
        "debug" => LogLevel::Debug,
        "trace" => LogLevel::Trace,
        _ => LogLevel::Info,
      },
      stdio: match self.log_stdio.as_str() {
        "json" => StdioLogMode::Json,
        "none" => StdioLogMode::None,
        _ => StdioLogMode::Standard,
      },
      pretty: self.log_pretty,
      otlp_endpoint: self.otlp_endpoint.clone(),
      opentelemetry_service_name: "forge-core".to_string(),
    }
  }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn core_config() -> &'static Config {
  CONFIG.get_or_init(|| {
    envy::from_env().expect("failed to parse config from environment")
  })
}
