//! Static, built-in artifact templates indexed by (language, target
//! platform). Used as the last-resort fallback when every LLM path
//! fails, and as few-shot priming context when running the generator
//! in LLM mode.

use forge_client::{ArtifactSet, Language, RepoDescriptor, TargetPlatform};

pub fn default_artifacts(platform: TargetPlatform, analysis: &RepoDescriptor) -> ArtifactSet {
  let mut artifacts = ArtifactSet::new(platform, analysis.clone());
  match platform {
    TargetPlatform::HostedPipeline => {
      artifacts.set("pipeline.yml", hosted_pipeline_template(analysis.language));
      artifacts.set("container.build", container_template(analysis.language));
    }
    TargetPlatform::BuildServer => {
      artifacts.set("Jenkinsfile", build_server_template(analysis.language));
    }
    TargetPlatform::RunnerService => {
      artifacts.set(".github/workflows/pipeline.yml", runner_service_template(analysis.language));
    }
    TargetPlatform::Infra => {
      artifacts.set("infra/main.tf", infra_template());
    }
  }
  artifacts
}

fn hosted_pipeline_template(language: Language) -> String {
  let (build_image, test_cmd) = build_image_and_test_cmd(language);
  format!(
    "stages:\n  - compile\n  - build\n  - test\n  - sast\n  - quality\n  - security\n  - push\n  - notify\n  - learn\n\ncompile:\n  stage: compile\n  image: {build_image}\n  script:\n    - echo \"compiling\"\n\nbuild:\n  stage: build\n  image: {build_image}\n  script:\n    - echo \"building\"\n\ntest:\n  stage: test\n  image: {build_image}\n  script:\n    - {test_cmd}\n\nsast:\n  stage: sast\n  image: checkmarx-kics\n  script:\n    - echo \"static analysis\" || true\n\nquality:\n  stage: quality\n  image: sonarsource-sonar-scanner-cli\n  script:\n    - echo \"quality gate\" || true\n\nsecurity:\n  stage: security\n  image: aquasec-trivy\n  script:\n    - echo \"image scan\" || true\n\npush:\n  stage: push\n  image: bitnami-git\n  script:\n    - echo \"push release\"\n\nnotify:\n  stage: notify\n  image: curlimages-curl\n  script:\n    - echo \"notify\"\n\nlearn:\n  stage: learn\n  image: curlimages-curl\n  script:\n    - echo \"record outcome\"\n"
  )
}

fn build_server_template(language: Language) -> String {
  let (build_image, test_cmd) = build_image_and_test_cmd(language);
  let mut stages = String::new();
  for name in crate::validator::required_sections::REQUIRED_STAGES {
    let title = capitalize(name);
    let step = if *name == "test" { test_cmd.to_string() } else { format!("echo {name}") };
    stages.push_str(&format!("    stage('{title}') {{ steps {{ sh '{step}' }} }}\n"));
  }
  format!(
    "pipeline {{\n  agent {{ docker {{ image '{build_image}' }} }}\n  stages {{\n{stages}  }}\n  post {{\n    always {{ echo 'done' }}\n  }}\n}}\n"
  )
}

fn runner_service_template(language: Language) -> String {
  let (build_image, test_cmd) = build_image_and_test_cmd(language);
  let mut jobs = String::new();
  for name in crate::validator::required_sections::REQUIRED_STAGES {
    let step = if *name == "test" { test_cmd.to_string() } else { format!("echo {name}") };
    jobs.push_str(&format!(
      "  {name}:\n    runs-on: ubuntu-latest\n    container:\n      image: {build_image}\n    steps:\n      - uses: actions/checkout@v4\n      - run: {step}\n"
    ));
  }
  format!("name: pipeline\non: [push]\njobs:\n{jobs}")
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

fn container_template(language: Language) -> String {
  let base = match language {
    Language::Java => "eclipse-temurin:17-jdk",
    Language::Javascript => "node:20-alpine",
    Language::Python => "python:3.12-slim",
    Language::Go => "golang:1.22-alpine",
    Language::Rust => "rust:1.80-slim",
    Language::Ruby => "ruby:3.3-slim",
    Language::Csharp => "mcr.microsoft.com/dotnet/sdk:8.0",
    Language::Unknown => "alpine:3.19",
  };
  format!("FROM {base}\nWORKDIR /app\nCOPY . .\nCMD [\"true\"]\n")
}

fn infra_template() -> String {
  "terraform {\n  required_version = \">= 1.5\"\n}\n\nvariable \"environment\" {\n  type = string\n}\n"
    .to_string()
}

fn build_image_and_test_cmd(language: Language) -> (&'static str, &'static str) {
  match language {
    Language::Java => ("maven-3.9-eclipse-temurin-17", "mvn test"),
    Language::Javascript => ("node-20", "npm test"),
    Language::Python => ("python-3.12", "pytest"),
    Language::Go => ("golang-1.22", "go test ./..."),
    Language::Rust => ("rust-1.80", "cargo test"),
    Language::Ruby => ("ruby-3.3", "bundle exec rspec"),
    Language::Csharp => ("dotnet-sdk-8.0", "dotnet test"),
    Language::Unknown => ("alpine-3.19", "echo no tests configured"),
  }
}
