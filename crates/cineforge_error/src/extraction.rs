//! JSON extraction error types.

/// Ways embedded JSON can fail to come out of free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ExtractionErrorKind {
    /// The text contains no JSON opening delimiter at all
    #[display("No JSON found in response")]
    NoJson,
    /// An opening delimiter was found but never balanced
    #[display("Truncated JSON starting at byte {}", _0)]
    Truncated(usize),
    /// A balanced candidate was found but did not parse
    #[display("Invalid JSON: {}", _0)]
    InvalidJson(String),
}

/// Extraction error with location tracking.
///
/// # Examples
///
/// ```
/// use cineforge_error::{ExtractionError, ExtractionErrorKind};
///
/// let err = ExtractionError::new(ExtractionErrorKind::NoJson);
/// assert!(format!("{}", err).contains("No JSON"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Extraction Error: {} at line {} in {}", kind, line, file)]
pub struct ExtractionError {
    /// The kind of error that occurred
    pub kind: ExtractionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ExtractionError {
    /// Create a new extraction error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ExtractionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
