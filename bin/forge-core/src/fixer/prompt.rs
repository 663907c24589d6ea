use forge_client::{ArtifactSet, ValidationReport};

use crate::templates::TemplateStore;

/// Prompt for the iterative validator-driven repair loop: current
/// artifacts, enumerated diagnostics, and the analysis that produced
/// them, framed to request marker-delimited output per file.
pub fn repair_prompt(
  artifacts: &ArtifactSet,
  report: &ValidationReport,
  allowed_images: &[String],
) -> String {
  let mut prompt = String::new();
  prompt.push_str(&format!(
    "Repository analysis: language={}, framework={:?}, package_manager={:?}\n\n",
    artifacts.analysis.language, artifacts.analysis.framework, artifacts.analysis.package_manager,
  ));

  prompt.push_str("Validation errors:\n");
  for error in report.errors() {
    prompt.push_str(&format!("- [{}] {}\n", error.check_name, error.message));
  }
  prompt.push_str("\nValidation warnings:\n");
  for warning in report.warnings() {
    prompt.push_str(&format!("- [{}] {}\n", warning.check_name, warning.message));
  }

  prompt.push_str("\nCurrent artifacts:\n");
  prompt.push_str(&TemplateStore::encode(artifacts));

  if !allowed_images.is_empty() {
    prompt.push_str("\nImages available in the private registry:\n");
    for image in allowed_images {
      prompt.push_str(&format!("- {image}\n"));
    }
  }

  prompt.push_str(&output_framing_instructions(artifacts));
  prompt
}

/// Single-pass prompt used by the monitor's runtime-failure repair: a
/// failed job name and a log excerpt take the place of validator
/// diagnostics.
pub fn runtime_failure_prompt(
  artifacts: &ArtifactSet,
  failed_job: &str,
  log_excerpt: &str,
) -> String {
  let mut prompt = String::new();
  prompt.push_str(&format!(
    "Repository analysis: language={}, framework={:?}\n\n",
    artifacts.analysis.language, artifacts.analysis.framework,
  ));
  prompt.push_str(&format!("Job '{failed_job}' failed during the actual build run. Log excerpt:\n"));
  prompt.push_str(log_excerpt);
  prompt.push_str("\n\nCurrent artifacts:\n");
  prompt.push_str(&TemplateStore::encode(artifacts));
  prompt.push_str(&output_framing_instructions(artifacts));
  prompt
}

fn output_framing_instructions(artifacts: &ArtifactSet) -> String {
  let mut out = String::from(
    "\nRespond with the corrected file(s) ONLY, using this exact framing \
     for each file that needs to change:\n\n---FILE:<filename>---\n<content>\n---END---\n\n",
  );
  out.push_str("Known filenames: ");
  out.push_str(&artifacts.files.keys().cloned().collect::<Vec<_>>().join(", "));
  out.push('\n');
  out
}
