//! Rewrite rules applied unconditionally after every LLM output,
//! whether it came from the iterative validator-driven fixer or the
//! single-pass runtime-failure repair. Never skipped.

use std::sync::OnceLock;

use regex::Regex;

/// Command prefixes that are allowed to fail without aborting the
/// stage they run in — analyzers, scanners, and linters, not build or
/// test steps.
const NON_CRITICAL_PREFIXES: &[&str] =
  &["trivy", "hadolint", "kics", "sonar-scanner", "semgrep"];

pub fn apply(
  mut content: String,
  public_registry_hosts: &[&str],
  private_registry_var: &str,
) -> String {
  for host in public_registry_hosts {
    content = content.replace(host, private_registry_var);
  }
  content = rewrite_https_to_http(&content, private_registry_var);
  content = suffix_non_critical_commands(&content);
  content
}

fn rewrite_https_to_http(content: &str, private_registry_var: &str) -> String {
  let pattern = format!("https://{private_registry_var}");
  content.replace(&pattern, &format!("http://{private_registry_var}"))
}

fn run_line_pattern() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?m)^(\s*-?\s*(?:run:|sh\s+'|script:\s*)?)(.+)$").unwrap())
}

fn suffix_non_critical_commands(content: &str) -> String {
  run_line_pattern()
    .replace_all(content, |caps: &regex::Captures| {
      let prefix = &caps[1];
      let rest = &caps[2];
      let is_non_critical = NON_CRITICAL_PREFIXES
        .iter()
        .any(|cmd| rest.trim_start().starts_with(cmd));
      if is_non_critical && !rest.contains("|| true") {
        format!("{prefix}{rest} || true")
      } else {
        format!("{prefix}{rest}")
      }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rewrites_public_registry_host() {
    let out = apply("FROM docker.io/library/alpine".into(), &["docker.io"], "REGISTRY_VAR");
    assert_eq!(out, "FROM REGISTRY_VAR/library/alpine");
  }

  #[test]
  fn downgrades_https_to_http_for_private_registry() {
    let out = apply(
      "image: https://REGISTRY_VAR/app:latest".into(),
      &[],
      "REGISTRY_VAR",
    );
    assert_eq!(out, "image: http://REGISTRY_VAR/app:latest");
  }

  #[test]
  fn suffixes_non_critical_scan_commands() {
    let out = apply("  - trivy image myapp:latest".into(), &[], "REGISTRY_VAR");
    assert!(out.trim_end().ends_with("|| true"));
  }
}
