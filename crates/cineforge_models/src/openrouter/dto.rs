//! OpenRouter data transfer objects.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    role: String,
    /// Message text
    content: String,
}

impl ChatMessage {
    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completions request body.
///
/// Passthrough parameters are flattened into the body and take precedence
/// over the named fields when keys collide.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct ChatRequest {
    /// Target model
    model: String,
    /// Conversation
    messages: Vec<ChatMessage>,
    /// Sampling temperature
    temperature: f32,
    /// Response token ceiling
    max_tokens: u32,
    /// Provider-specific extras
    #[serde(skip)]
    extra: Map<String, JsonValue>,
}

impl ChatRequest {
    /// Assemble a request.
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
        extra: Map<String, JsonValue>,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            max_tokens,
            extra,
        }
    }

    /// JSON body with extras applied last.
    pub fn to_body(&self) -> JsonValue {
        let mut body = match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.extra {
            body.insert(key.clone(), value.clone());
        }
        JsonValue::Object(body)
    }
}

/// Message inside a choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text
    #[serde(default)]
    pub content: Option<String>,
}

/// One completion choice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Choice {
    /// Generated message
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ChatUsage {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: u32,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: u32,
}

/// Chat-completions response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    /// Completion id
    #[serde(default)]
    pub id: Option<String>,
    /// Unix creation time
    #[serde(default)]
    pub created: Option<i64>,
    /// Model that served the request
    #[serde(default)]
    pub model: Option<String>,
    /// Choices, first one is used
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Text of the first choice, empty when absent.
    pub fn first_text(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .unwrap_or_default()
    }

    /// Finish reason of the first choice.
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.finish_reason.as_deref())
    }
}

/// One entry of the model catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ModelInfo {
    /// Model identifier
    id: String,
    /// Display name
    #[serde(default)]
    name: Option<String>,
    /// Context window
    #[serde(default)]
    context_length: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}
