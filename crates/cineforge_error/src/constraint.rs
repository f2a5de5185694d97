//! Hard constraint violation reported by the validator.

use std::fmt;

/// One hard finding that blocked persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViolationDetail {
    /// Field the finding is about (e.g. "sceneCount")
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// 0-based scene the finding points at, when it is scene-specific
    pub scene_index: Option<usize>,
}

impl ViolationDetail {
    /// Create a new violation detail.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        scene_index: Option<usize>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            scene_index,
        }
    }
}

/// Hard constraint violation with location tracking.
///
/// Carries every hard finding in report order so callers can point at the
/// failing field or scene. Display joins the messages with ", ".
///
/// # Examples
///
/// ```
/// use cineforge_error::{ConstraintViolation, ViolationDetail};
///
/// let err = ConstraintViolation::new(vec![ViolationDetail::new(
///     "sceneCount",
///     "Scene count mismatch: expected 3, got 2",
///     None,
/// )]);
/// assert_eq!(
///     format!("{}", err),
///     "Validation failed: Scene count mismatch: expected 3, got 2"
/// );
/// ```
#[derive(Debug, Clone, derive_more::Error)]
pub struct ConstraintViolation {
    /// Hard findings, in report order
    pub details: Vec<ViolationDetail>,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConstraintViolation {
    /// Create a new constraint violation with automatic location tracking.
    #[track_caller]
    pub fn new(details: Vec<ViolationDetail>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            details,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Messages of every hard finding.
    pub fn messages(&self) -> Vec<&str> {
        self.details.iter().map(|d| d.message.as_str()).collect()
    }

    /// True if any finding concerns the given field.
    pub fn has_field(&self, field: &str) -> bool {
        self.details.iter().any(|d| d.field == field)
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.messages().join(", "))
    }
}
