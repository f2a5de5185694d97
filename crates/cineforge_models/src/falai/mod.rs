//! FAL media generation integration.

mod client;

pub use client::FalAiAdapter;
