use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Java,
  Javascript,
  Python,
  Go,
  Rust,
  Ruby,
  Csharp,
  Unknown,
}

impl std::fmt::Display for Language {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Language::Java => "java",
      Language::Javascript => "javascript",
      Language::Python => "python",
      Language::Go => "go",
      Language::Rust => "rust",
      Language::Ruby => "ruby",
      Language::Csharp => "csharp",
      Language::Unknown => "unknown",
    };
    f.write_str(s)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
  Yarn,
  Npm,
  Pnpm,
  Pip,
  Poetry,
  Maven,
  Gradle,
  CargoPm,
  Bundler,
  GoModules,
  Unknown,
}

/// Two supported repository host API flavors. Dispatch between them is
/// a `match` inside one client type rather than a trait-object
/// hierarchy — see the committer and repo analyzer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum HostKind {
  GithubStyle,
  GiteaStyle,
}

/// The three CI surfaces this crate can target, plus an infra variant
/// used by the workspace sweeper / infra-execution tool path.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPlatform {
  HostedPipeline,
  BuildServer,
  RunnerService,
  Infra,
}

impl TargetPlatform {
  pub fn as_str(&self) -> &'static str {
    match self {
      TargetPlatform::HostedPipeline => "hosted-pipeline",
      TargetPlatform::BuildServer => "build-server",
      TargetPlatform::RunnerService => "runner-service",
      TargetPlatform::Infra => "infra",
    }
  }
}

/// Result of inspecting a repository's top-level file listing.
/// `"unknown"` fields are valid, expected outcomes, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoDescriptor {
  pub host: HostKind,
  pub owner: String,
  pub repo: String,
  pub default_branch: String,
  pub language: Language,
  pub framework: Option<String>,
  pub package_manager: PackageManager,
  pub file_list: Vec<String>,
  pub has_artifacts: bool,
}

impl RepoDescriptor {
  pub fn identity(&self) -> String {
    format!("{}/{}", self.owner, self.repo)
  }
}
