//! Bounded, explicitly owned instance cache.
//!
//! The composition root owns one [`InstanceCache`] of generation adapters so
//! repeated requests for the same configuration reuse a single client. The
//! cache is an ordinary value with an explicit [`InstanceCache::clear`], not a
//! process-wide singleton.

#![warn(missing_docs)]

mod cache;

pub use cache::{ConfigKey, InstanceCache, InstanceCacheConfig, InstanceCacheConfigBuilder};
