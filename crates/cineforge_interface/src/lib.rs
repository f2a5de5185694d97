//! Trait definitions for the Cineforge story pipeline.
//!
//! Two seams separate the pipeline from the outside world: the
//! [`GenerationAdapter`] every provider family implements, and the
//! [`RecordStore`] persistence collaborator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod store;

pub use adapter::GenerationAdapter;
pub use store::{EntityKind, RecordKey, RecordStore};
