//! Error types for the Cineforge story pipeline.
//!
//! This crate provides the error taxonomy shared by every Cineforge crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use cineforge_error::{CineforgeResult, InputError, InputErrorKind};
//!
//! fn load_project(id: &str) -> CineforgeResult<()> {
//!     if id.is_empty() {
//!         Err(InputError::new(InputErrorKind::MissingField("projectId".to_string())))?
//!     }
//!     Ok(())
//! }
//!
//! let err = load_project("").unwrap_err();
//! assert_eq!(err.http_status(), 400);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod constraint;
mod error;
mod extraction;
mod http;
mod input;
mod json;
mod narrative;
mod provider;
mod storage;

pub use config::ConfigError;
pub use constraint::{ConstraintViolation, ViolationDetail};
pub use error::{CineforgeError, CineforgeErrorKind, CineforgeResult};
pub use extraction::{ExtractionError, ExtractionErrorKind};
pub use http::HttpError;
pub use input::{FieldViolation, InputError, InputErrorKind};
pub use json::JsonError;
pub use narrative::{NarrativeError, NarrativeErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
