//! Generation provider adapters for Cineforge.
//!
//! One [`GenerationAdapter`](cineforge_interface::GenerationAdapter)
//! implementation per provider family:
//!
//! - [`OpenRouterAdapter`]: chat-completions text generation across many models
//! - [`FalAiAdapter`]: image, video and audio generation
//!
//! [`AdapterFactory`] resolves an [`AdapterConfig`] (or a named preset) to a
//! shared adapter instance, caching by configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod factory;
mod falai;
mod http;
mod openrouter;
mod settings;

pub use factory::{AdapterConfig, AdapterConfigBuilder, AdapterFactory, AdapterFamily, PRESETS};
pub use falai::FalAiAdapter;
pub use openrouter::{
    ChatMessage, ChatRequest, ChatResponse, ModelInfo, OpenRouterAdapter,
};
pub use settings::{FalAiSettings, OpenRouterSettings, ProviderSettings};
