//! Repository inspection: a fixed first-match-wins decision tree over
//! a repository's top-level filename set. Missing or ambiguous
//! evidence yields `Language::Unknown` / `PackageManager::Unknown`
//! rather than a hard error — the generator still produces a default
//! template in that case.

use forge_client::{HostKind, Language, PackageManager, RepoDescriptor};

use crate::host_client::HostClient;

pub async fn analyze(
  host: &HostClient,
  owner: &str,
  repo: &str,
) -> anyhow::Result<RepoDescriptor> {
  let default_branch = host.default_branch(owner, repo).await?;
  let file_list = host.list_root(owner, repo, &default_branch).await?;

  let language = detect_language(&file_list);
  let framework = detect_framework(&file_list, language);
  let package_manager = detect_package_manager(&file_list);
  let has_artifacts = file_list.iter().any(|f| {
    matches!(
      f.as_str(),
      ".gitlab-ci.yml" | "Jenkinsfile" | ".github/workflows"
    )
  });

  Ok(RepoDescriptor {
    host: host.kind(),
    owner: owner.to_string(),
    repo: repo.to_string(),
    default_branch,
    language,
    framework,
    package_manager,
    file_list,
    has_artifacts,
  })
}

fn detect_language(files: &[String]) -> Language {
  let has = |name: &str| files.iter().any(|f| f == name);
  let has_suffix =
    |suffix: &str| files.iter().any(|f| f.ends_with(suffix));

  if has("pom.xml") || has("build.gradle") || has("build.gradle.kts") {
    Language::Java
  } else if has("package.json") {
    Language::Javascript
  } else if has("requirements.txt") || has("setup.py") || has("pyproject.toml") {
    Language::Python
  } else if has("go.mod") {
    Language::Go
  } else if has("Cargo.toml") {
    Language::Rust
  } else if has("Gemfile") {
    Language::Ruby
  } else if has_suffix(".csproj") {
    Language::Csharp
  } else {
    Language::Unknown
  }
}

fn detect_framework(
  files: &[String],
  language: Language,
) -> Option<String> {
  let has = |name: &str| files.iter().any(|f| f == name);
  let has_prefix =
    |prefix: &str| files.iter().any(|f| f.starts_with(prefix));

  match language {
    Language::Python if has("manage.py") => Some("django".into()),
    Language::Python if has("app.py") || has("wsgi.py") => Some("flask".into()),
    Language::Javascript if has_prefix("next.config") => Some("nextjs".into()),
    Language::Javascript if has("angular.json") => Some("angular".into()),
    Language::Javascript if has_prefix("vite.config") => Some("vite".into()),
    Language::Java if has("pom.xml") => Some("spring".into()),
    _ => None,
  }
}

fn detect_package_manager(files: &[String]) -> PackageManager {
  let has = |name: &str| files.iter().any(|f| f == name);

  if has("pom.xml") {
    PackageManager::Maven
  } else if has("build.gradle") || has("build.gradle.kts") {
    PackageManager::Gradle
  } else if has("yarn.lock") {
    PackageManager::Yarn
  } else if has("package-lock.json") {
    PackageManager::Npm
  } else if has("pnpm-lock.yaml") {
    PackageManager::Pnpm
  } else if has("poetry.lock") {
    PackageManager::Poetry
  } else if has("requirements.txt") {
    PackageManager::Pip
  } else if has("Cargo.toml") {
    PackageManager::CargoPm
  } else if has("Gemfile") {
    PackageManager::Bundler
  } else if has("go.mod") {
    PackageManager::GoModules
  } else {
    PackageManager::Unknown
  }
}

pub fn default_host_kind(raw: &str) -> HostKind {
  match raw {
    "github" => HostKind::GithubStyle,
    _ => HostKind::GiteaStyle,
  }
}
