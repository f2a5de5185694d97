//! Validation report types.

use serde::{Deserialize, Serialize};

/// Whether a finding blocks persistence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Blocks persistence
    Hard,
    /// Informational only
    Soft,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Hard or soft
    #[serde(rename = "type", alias = "severity")]
    pub severity: Severity,
    /// Field the finding concerns
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// 0-based scene the finding points at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_index: Option<usize>,
}

impl ValidationIssue {
    /// Hard finding.
    pub fn hard(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Hard,
            field: field.into(),
            message: message.into(),
            scene_index: None,
        }
    }

    /// Soft finding.
    pub fn soft(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Soft,
            field: field.into(),
            message: message.into(),
            scene_index: None,
        }
    }

    /// Attach a scene index.
    pub fn at_scene(mut self, index: usize) -> Self {
        self.scene_index = Some(index);
        self
    }

    /// True for hard findings.
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

/// Result of one validation pass. Never persisted as-is.
///
/// `is_valid` always equals "no hard errors"; every constructor keeps
/// that invariant.
///
/// # Examples
///
/// ```
/// use cineforge_core::{ValidationIssue, ValidationOutput};
///
/// let report = ValidationOutput::new(
///     vec![ValidationIssue::soft("style", "Scene 2 reads as dialogue-heavy")],
///     vec![],
/// );
/// assert!(report.is_valid());
///
/// let report = report.merge(ValidationOutput::new(
///     vec![ValidationIssue::hard("sceneCount", "Scene count mismatch: expected 3, got 2")],
///     vec!["Check pacing".to_string()],
/// ));
/// assert!(!report.is_valid());
/// assert_eq!(report.hard_errors().count(), 1);
/// assert_eq!(report.warnings().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutput {
    is_valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<String>,
}

impl ValidationOutput {
    /// Report from findings, deriving validity.
    pub fn new(errors: Vec<ValidationIssue>, warnings: Vec<String>) -> Self {
        let is_valid = !errors.iter().any(ValidationIssue::is_hard);
        Self {
            is_valid,
            errors,
            warnings,
        }
    }

    /// Clean report.
    pub fn valid() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// No hard errors.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// All findings in report order.
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Free-text warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Findings that block persistence.
    pub fn hard_errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(|e| e.is_hard())
    }

    /// Informational findings.
    pub fn soft_errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(|e| !e.is_hard())
    }

    /// Concatenates two reports, this one first, dropping duplicate warnings.
    pub fn merge(self, other: ValidationOutput) -> Self {
        let mut errors = self.errors;
        errors.extend(other.errors);
        let mut warnings = self.warnings;
        for warning in other.warnings {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        Self::new(errors, warnings)
    }

    /// Report with one more warning appended.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}
