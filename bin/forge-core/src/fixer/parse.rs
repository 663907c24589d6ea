//! Fault-tolerant response parsing: marker-delimited sections first,
//! falling back to fenced code blocks, and finally rejecting the
//! response outright if neither yields usable content. Grounded on
//! the marker/code-block/reject fallback chain in the LLM fixer this
//! pipeline was distilled from.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

fn marker_pattern() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"(?s)---FILE:([^\n-]+)---\s*\n(.*?)\n---END---").unwrap()
  })
}

fn code_block_pattern() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)###\s*([^\n]+)\n```[a-zA-Z]*\n(.*?)\n```").unwrap())
}

/// Parses an LLM response into a filename -> content map, known files
/// only. Returns `None` if nothing could be extracted by any tier —
/// the caller should discard this attempt and retry with a
/// decremented budget.
pub fn parse_response(
  response: &str,
  known_files: &[String],
) -> Option<HashMap<String, String>> {
  if let Some(files) = parse_markers(response) {
    if !files.is_empty() {
      return Some(files);
    }
  }
  if let Some(files) = parse_code_blocks(response) {
    if !files.is_empty() {
      return Some(files);
    }
  }
  // Single-file responses with no markers at all: accept only when
  // there is exactly one known file to disambiguate into.
  if known_files.len() == 1 && !response.trim().is_empty() {
    let mut out = HashMap::new();
    out.insert(known_files[0].clone(), response.trim().to_string());
    return Some(out);
  }
  None
}

fn parse_markers(response: &str) -> Option<HashMap<String, String>> {
  let mut out = HashMap::new();
  for cap in marker_pattern().captures_iter(response) {
    let name = cap[1].trim().to_string();
    let content = cap[2].trim().to_string();
    if !content.is_empty() {
      out.insert(name, content);
    }
  }
  if out.is_empty() { None } else { Some(out) }
}

fn parse_code_blocks(response: &str) -> Option<HashMap<String, String>> {
  let mut out = HashMap::new();
  for cap in code_block_pattern().captures_iter(response) {
    let name = cap[1].trim().to_string();
    let content = cap[2].trim().to_string();
    if !content.is_empty() {
      out.insert(name, content);
    }
  }
  if out.is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_marker_delimited_files() {
    let response = "---FILE:pipeline.yml---\nstages:\n  - build\n---END---\n\
       ---FILE:container.build---\nFROM alpine\n---END---";
    let files = parse_response(response, &[]).unwrap();
    assert_eq!(files.get("pipeline.yml").unwrap(), "stages:\n  - build");
    assert_eq!(files.get("container.build").unwrap(), "FROM alpine");
  }

  #[test]
  fn falls_back_to_code_blocks() {
    let response = "### pipeline.yml\n```yaml\nstages:\n  - build\n```\n";
    let files = parse_response(response, &[]).unwrap();
    assert_eq!(files.get("pipeline.yml").unwrap(), "stages:\n  - build");
  }

  #[test]
  fn rejects_unparseable_multi_file_response() {
    assert!(parse_response(
      "just some prose, no markers",
      &["a.yml".into(), "b.yml".into()]
    )
    .is_none());
  }

  #[test]
  fn accepts_raw_single_file_response() {
    let files =
      parse_response("FROM alpine\nRUN echo hi", &["container.build".into()]).unwrap();
    assert_eq!(files.get("container.build").unwrap(), "FROM alpine\nRUN echo hi");
  }
}
