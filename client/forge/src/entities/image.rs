use serde::{Deserialize, Serialize};

/// A parsed image reference. Equivalence is over the canonical
/// (registry, namespace, name, tag) tuple, never the raw string it was
/// parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
  pub registry: Option<String>,
  pub namespace: Option<String>,
  pub name: String,
  pub tag: String,
}

impl ImageRef {
  /// Parses `[registry/]namespace/name[:tag]` or `[registry/]name[:tag]`.
  /// A missing tag defaults to `latest`, per the registry gateway's
  /// existence-check/seed contract.
  pub fn parse(raw: &str) -> Self {
    let (path, tag) = match raw.rsplit_once(':') {
      // A colon before the last '/' is a registry port, not a tag
      // separator (e.g. `localhost:5000/app`).
      Some((path, tag)) if !tag.contains('/') => {
        (path.to_string(), tag.to_string())
      }
      _ => (raw.to_string(), "latest".to_string()),
    };

    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
      [name] => ImageRef {
        registry: None,
        namespace: None,
        name: name.to_string(),
        tag,
      },
      [namespace, name] => ImageRef {
        registry: None,
        namespace: Some(namespace.to_string()),
        name: name.to_string(),
        tag,
      },
      [registry, namespace, name] => ImageRef {
        registry: Some(registry.to_string()),
        namespace: Some(namespace.to_string()),
        name: name.to_string(),
        tag,
      },
      // Longer paths (rare): fold everything but the last segment into
      // the namespace, keep the first segment as registry.
      [registry, rest @ ..] if rest.len() >= 2 => {
        let name = rest.last().unwrap().to_string();
        let namespace = rest[..rest.len() - 1].join("/");
        ImageRef {
          registry: Some(registry.to_string()),
          namespace: Some(namespace),
          name,
          tag,
        }
      }
      _ => ImageRef {
        registry: None,
        namespace: None,
        name: path,
        tag,
      },
    }
  }

  /// Canonical Nexus-hyphenated bare name, e.g. `curlimages-curl`.
  pub fn nexus_name(&self) -> String {
    match &self.namespace {
      Some(ns) => format!("{}-{}", ns.replace('/', "-"), self.name),
      None => self.name.clone(),
    }
  }

  pub fn nexus_bare(&self) -> String {
    format!("{}:{}", self.nexus_name(), self.tag)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_bare_name() {
    let r = ImageRef::parse("curl");
    assert_eq!(r.namespace, None);
    assert_eq!(r.name, "curl");
    assert_eq!(r.tag, "latest");
  }

  #[test]
  fn parses_namespaced_with_tag() {
    let r = ImageRef::parse("curlimages/curl:8.1.0");
    assert_eq!(r.namespace.as_deref(), Some("curlimages"));
    assert_eq!(r.name, "curl");
    assert_eq!(r.tag, "8.1.0");
    assert_eq!(r.nexus_name(), "curlimages-curl");
  }

  #[test]
  fn keeps_registry_port_out_of_tag() {
    let r = ImageRef::parse("localhost:5000/apm-repo/demo/maven");
    assert_eq!(r.registry.as_deref(), Some("localhost:5000"));
    assert_eq!(r.tag, "latest");
  }
}
