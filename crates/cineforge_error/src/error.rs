//! Top-level error wrapper types.

use crate::{
    ConfigError, ConstraintViolation, ExtractionError, HttpError, InputError, JsonError,
    NarrativeError, NarrativeErrorKind, ProviderError, ProviderErrorKind, StorageError,
    StorageErrorKind,
};

/// Every error condition the pipeline can surface.
///
/// # Examples
///
/// ```
/// use cineforge_error::{CineforgeError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: CineforgeError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CineforgeErrorKind {
    /// HTTP client error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Caller input failed schema constraints
    #[from(InputError)]
    Input(InputError),
    /// Generation backend failure
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Hard validation findings blocked persistence
    #[from(ConstraintViolation)]
    Constraint(ConstraintViolation),
    /// Embedded JSON could not be extracted
    #[from(ExtractionError)]
    Extraction(ExtractionError),
    /// Record store failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Pipeline state error
    #[from(NarrativeError)]
    Narrative(NarrativeError),
}

/// Cineforge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use cineforge_error::{CineforgeResult, ConfigError};
///
/// fn might_fail() -> CineforgeResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert_eq!(might_fail().unwrap_err().http_status(), 500);
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Cineforge Error: {}", _0)]
pub struct CineforgeError(Box<CineforgeErrorKind>);

impl CineforgeError {
    /// Create a new error from a kind.
    pub fn new(kind: CineforgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CineforgeErrorKind {
        &self.0
    }

    /// Hard validation findings, if this is a constraint violation.
    pub fn constraint_violation(&self) -> Option<&ConstraintViolation> {
        match self.kind() {
            CineforgeErrorKind::Constraint(violation) => Some(violation),
            _ => None,
        }
    }

    /// Status-code equivalent for transport layers.
    ///
    /// Input errors map to 4xx, provider failures to 502/504.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            CineforgeErrorKind::Input(err) if err.is_not_found() => 404,
            CineforgeErrorKind::Input(_) => 400,
            CineforgeErrorKind::Constraint(_) => 422,
            CineforgeErrorKind::Provider(err) => match err.kind {
                ProviderErrorKind::Timeout { .. } => 504,
                _ => 502,
            },
            CineforgeErrorKind::Narrative(err) => match err.kind {
                NarrativeErrorKind::MissingStory(_) | NarrativeErrorKind::MissingBlueprint(_) => {
                    404
                }
                NarrativeErrorKind::SceneLocked(_) => 409,
                NarrativeErrorKind::InvalidTransition { .. } => 500,
            },
            CineforgeErrorKind::Storage(err) => match err.kind {
                StorageErrorKind::NotFound(_) => 404,
                _ => 500,
            },
            _ => 500,
        }
    }
}

// Generic From implementation for any type that converts to CineforgeErrorKind
impl<T> From<T> for CineforgeError
where
    T: Into<CineforgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Cineforge operations.
pub type CineforgeResult<T> = std::result::Result<T, CineforgeError>;
