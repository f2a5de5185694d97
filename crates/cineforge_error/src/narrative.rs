//! Narrative pipeline error types.

/// Pipeline state errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NarrativeErrorKind {
    /// Project has no stored story yet
    #[display("No story stored for project {}", _0)]
    MissingStory(String),
    /// Project has no stored blueprint yet
    #[display("No blueprint stored for project {}", _0)]
    MissingBlueprint(String),
    /// Scene is locked against regeneration
    #[display("Scene {} is locked", _0)]
    SceneLocked(usize),
    /// Edit session was driven out of order
    #[display("Invalid edit transition from {} via {}", from, action)]
    InvalidTransition {
        /// State the session was in
        from: String,
        /// Attempted action
        action: String,
    },
}

/// Narrative error with location tracking.
///
/// # Examples
///
/// ```
/// use cineforge_error::{NarrativeError, NarrativeErrorKind};
///
/// let err = NarrativeError::new(NarrativeErrorKind::SceneLocked(2));
/// assert!(format!("{}", err).contains("locked"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narrative Error: {} at line {} in {}", kind, line, file)]
pub struct NarrativeError {
    /// The kind of error that occurred
    pub kind: NarrativeErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NarrativeError {
    /// Create a new narrative error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrativeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
