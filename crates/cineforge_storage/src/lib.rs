//! Record store backends for Cineforge.
//!
//! Two implementations of [`cineforge_interface::RecordStore`]:
//!
//! - [`InMemoryRecordStore`]: process-local, for tests and ephemeral runs
//! - [`FileSystemRecordStore`]: one JSON document per record, written
//!   atomically through a temp file and rename

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod merge;

pub use filesystem::FileSystemRecordStore;
pub use memory::InMemoryRecordStore;
pub use merge::merge_fields;
