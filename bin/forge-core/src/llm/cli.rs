//! CLI-wrapped hosted-model provider: spawns an external CLI, requests
//! structured JSON on stdout, and falls back to raw stdout if that
//! parse fails. Grounded on the Claude Code CLI integration this
//! pipeline was distilled from.

use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use command::run_forge_command;
use serde_json::Value;
use tracing::warn;

use super::{GenerateRequest, LlmProvider};

pub struct CliWrappedProvider {
  binary: String,
}

impl CliWrappedProvider {
  pub fn new(binary: String) -> Self {
    CliWrappedProvider { binary }
  }
}

#[async_trait]
impl LlmProvider for CliWrappedProvider {
  async fn generate(&self, request: GenerateRequest<'_>) -> anyhow::Result<String> {
    let timeout = request.options.timeout.unwrap_or(Duration::from_secs(180));
    let escaped_prompt = shell_quote(request.prompt);
    let escaped_system = shell_quote(request.system);

    let command = format!(
      "{} -p {escaped_prompt} --append-system-prompt {escaped_system} \
       --output-format json --model {} --max-turns 1",
      self.binary, request.model
    );

    let log = tokio::time::timeout(timeout, run_forge_command("llm-cli", None, command))
      .await
      .context("cli provider timed out")?;

    if !log.success {
      bail!("cli provider exited with failure: {}", log.stderr);
    }

    Ok(parse_cli_output(&log.stdout))
  }
}

fn parse_cli_output(stdout: &str) -> String {
  match serde_json::from_str::<Value>(stdout.trim()) {
    Ok(value) => match value.get("result").and_then(Value::as_str) {
      Some(result) => result.to_string(),
      None => {
        warn!("cli provider JSON missing 'result' field, using raw stdout");
        stdout.to_string()
      }
    },
    Err(_) => stdout.to_string(),
  }
}

fn shell_quote(s: &str) -> String {
  format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_structured_json_result() {
    let out = parse_cli_output(r#"{"result": "pipeline text"}"#);
    assert_eq!(out, "pipeline text");
  }

  #[test]
  fn falls_back_to_raw_stdout_on_malformed_json() {
    let out = parse_cli_output("not json at all");
    assert_eq!(out, "not json at all");
  }
}
