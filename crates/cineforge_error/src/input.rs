//! Caller input error types.

use std::fmt;

/// A single field that failed schema constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldViolation {
    /// Name of the offending field, as exposed to callers (camelCase)
    pub field: String,
    /// Human-readable description of the violated rule
    pub message: String,
}

impl FieldViolation {
    /// Create a new field violation.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Kinds of caller input errors.
///
/// These are rejected before any generation call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputErrorKind {
    /// A required value was not supplied
    MissingField(String),
    /// One or more fields failed schema constraints
    InvalidFields(Vec<FieldViolation>),
    /// An edit addressed a scene that does not exist
    SceneIndexOutOfRange {
        /// Requested 0-based scene index
        index: usize,
        /// Number of scenes currently stored
        scene_count: usize,
    },
    /// A referenced record does not exist
    NotFound {
        /// Entity kind (e.g. "story")
        entity: String,
        /// Lookup key
        key: String,
    },
}

impl fmt::Display for InputErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputErrorKind::MissingField(field) => write!(f, "Missing required field: {}", field),
            InputErrorKind::InvalidFields(violations) => {
                let joined = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "Invalid input: {}", joined)
            }
            InputErrorKind::SceneIndexOutOfRange { index, scene_count } => write!(
                f,
                "Scene index {} out of range (story has {} scenes)",
                index, scene_count
            ),
            InputErrorKind::NotFound { entity, key } => {
                write!(f, "{} not found: {}", entity, key)
            }
        }
    }
}

/// Input error with location tracking.
///
/// # Examples
///
/// ```
/// use cineforge_error::{FieldViolation, InputError, InputErrorKind};
///
/// let err = InputError::new(InputErrorKind::InvalidFields(vec![
///     FieldViolation::new("sceneCount", "must be between 1 and 20"),
/// ]));
/// assert!(format!("{}", err).contains("sceneCount"));
/// assert_eq!(err.violations().len(), 1);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Input Error: {} at line {} in {}", kind, line, file)]
pub struct InputError {
    /// The kind of error that occurred
    pub kind: InputErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl InputError {
    /// Create a new input error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: InputErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Field-level detail for callers that render per-field messages.
    ///
    /// Kinds without field detail report a single pseudo-violation.
    pub fn violations(&self) -> Vec<FieldViolation> {
        match &self.kind {
            InputErrorKind::InvalidFields(violations) => violations.clone(),
            InputErrorKind::MissingField(field) => {
                vec![FieldViolation::new(field.clone(), "is required")]
            }
            InputErrorKind::SceneIndexOutOfRange { scene_count, .. } => vec![FieldViolation::new(
                "sceneIndex",
                format!("must be less than {}", scene_count),
            )],
            InputErrorKind::NotFound { entity, .. } => {
                vec![FieldViolation::new(entity.clone(), "not found")]
            }
        }
    }

    /// True when the error describes a missing record rather than bad data.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, InputErrorKind::NotFound { .. })
    }
}
