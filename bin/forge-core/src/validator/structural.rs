use forge_client::{ArtifactSet, ValidationDiagnostic};

pub fn check(artifacts: &ArtifactSet) -> Vec<ValidationDiagnostic> {
  let mut diagnostics = Vec::new();

  for (name, content) in &artifacts.files {
    if name.ends_with(".yml") || name.ends_with(".yaml") {
      if let Err(err) = serde_yaml_ng::from_str::<serde_yaml_ng::Value>(content) {
        diagnostics.push(ValidationDiagnostic::error(
          "structural-parse",
          format!("{name} is not valid YAML: {err}"),
        ));
      }
    } else if name == "Jenkinsfile" || name.ends_with(".tf") {
      if let Err(reason) = balanced_braces(content) {
        diagnostics.push(ValidationDiagnostic::error(
          "structural-parse",
          format!("{name} has unbalanced braces: {reason}"),
        ));
      }
    }
  }

  diagnostics
}

fn balanced_braces(content: &str) -> Result<(), &'static str> {
  let mut depth: i32 = 0;
  for c in content.chars() {
    match c {
      '{' => depth += 1,
      '}' => {
        depth -= 1;
        if depth < 0 {
          return Err("unmatched closing brace");
        }
      }
      _ => {}
    }
  }
  if depth != 0 { Err("unmatched opening brace") } else { Ok(()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use forge_client::{HostKind, Language, PackageManager, RepoDescriptor, TargetPlatform};

  fn descriptor() -> RepoDescriptor {
    RepoDescriptor {
      host: HostKind::GiteaStyle,
      owner: "a".into(),
      repo: "b".into(),
      default_branch: "main".into(),
      language: Language::Go,
      framework: None,
      package_manager: PackageManager::GoModules,
      file_list: vec![],
      has_artifacts: false,
    }
  }

  #[test]
  fn flags_broken_yaml() {
    let mut artifacts = ArtifactSet::new(TargetPlatform::HostedPipeline, descriptor());
    artifacts.set("pipeline.yml", "stages: [unterminated");
    assert!(!check(&artifacts).is_empty());
  }

  #[test]
  fn accepts_valid_yaml() {
    let mut artifacts = ArtifactSet::new(TargetPlatform::HostedPipeline, descriptor());
    artifacts.set("pipeline.yml", "stages:\n  - build\n");
    assert!(check(&artifacts).is_empty());
  }
}
