//! OpenRouter chat-completions integration.

mod client;
mod dto;

pub use client::OpenRouterAdapter;
pub use dto::{ChatMessage, ChatRequest, ChatResponse, ModelInfo};
