use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
  Error,
  Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationDiagnostic {
  pub check_name: String,
  pub kind: DiagnosticKind,
  pub message: String,
}

impl ValidationDiagnostic {
  pub fn error(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    ValidationDiagnostic {
      check_name: check_name.into(),
      kind: DiagnosticKind::Error,
      message: message.into(),
    }
  }

  pub fn warning(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    ValidationDiagnostic {
      check_name: check_name.into(),
      kind: DiagnosticKind::Warning,
      message: message.into(),
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
  pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
  pub fn has_errors(&self) -> bool {
    self
      .diagnostics
      .iter()
      .any(|d| d.kind == DiagnosticKind::Error)
  }

  pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
    self
      .diagnostics
      .iter()
      .filter(|d| d.kind == DiagnosticKind::Error)
  }

  pub fn warnings(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
    self
      .diagnostics
      .iter()
      .filter(|d| d.kind == DiagnosticKind::Warning)
  }

  pub fn extend(&mut self, other: impl IntoIterator<Item = ValidationDiagnostic>) {
    self.diagnostics.extend(other);
  }
}
