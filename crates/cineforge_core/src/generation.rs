//! Generation request and response shapes exchanged with adapters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Output modality of a generation backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Modality {
    /// Text generation (LLM)
    #[default]
    Text,
    /// Still images
    Image,
    /// Speech or music
    Audio,
    /// Video clips
    Video,
}

/// One generation request.
///
/// Keys in `extra` are passed through to the provider and override the
/// adapter's defaults for the same key.
///
/// # Examples
///
/// ```
/// use cineforge_core::GenerationParams;
///
/// let params = GenerationParams::builder()
///     .prompt("Write one scene")
///     .system_prompt("You are a screenwriter")
///     .temperature(0.3f32)
///     .build()
///     .unwrap();
///
/// assert_eq!(*params.max_tokens(), 4000);
/// assert_eq!(params.system_prompt().as_deref(), Some("You are a screenwriter"));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct GenerationParams {
    /// User prompt
    prompt: String,
    /// Optional system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    system_prompt: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    #[builder(default = "default_temperature()")]
    temperature: f32,
    /// Token ceiling for the response
    #[serde(default = "default_max_tokens")]
    #[builder(default = "default_max_tokens()")]
    max_tokens: u32,
    /// Provider-specific passthrough parameters
    #[serde(default)]
    #[builder(default)]
    extra: Map<String, JsonValue>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

impl GenerationParams {
    /// Creates a new params builder.
    pub fn builder() -> GenerationParamsBuilder {
        GenerationParamsBuilder::default()
    }

    /// Params with defaults for everything but the prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            extra: Map::new(),
        }
    }

    /// Same params with a system instruction.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Same params with different sampling settings.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Adds or replaces one passthrough parameter.
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Passthrough value for `key`, if set.
    pub fn extra_value(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }
}

/// What a generation call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum GenerationOutput {
    /// Generated text
    Text(String),
    /// Structured payload the adapter could not reduce further
    Structured(JsonValue),
    /// Handle to generated media
    Media {
        /// Where the media can be fetched
        url: String,
        /// MIME type, when known
        mime: Option<String>,
    },
}

impl GenerationOutput {
    /// Text content, if this is a text output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GenerationOutput::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Media URL, if this is a media output.
    pub fn media_url(&self) -> Option<&str> {
        match self {
            GenerationOutput::Media { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
    /// Sum of both
    pub total_tokens: u32,
}

/// Result of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Produced output
    pub output: GenerationOutput,
    /// Model that served the request
    pub model: String,
    /// Token usage, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Provider metadata (ids, timings, finish reasons)
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

impl GenerationResult {
    /// Text result without usage or metadata.
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            output: GenerationOutput::Text(text.into()),
            model: model.into(),
            usage: None,
            metadata: Map::new(),
        }
    }
}

/// Static description of what an adapter can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapabilities {
    /// Output modality
    modality: Modality,
    /// Response token ceiling, for text models
    max_tokens: Option<u32>,
    /// Output formats (e.g. "png", "mp4")
    supported_formats: Vec<String>,
    /// Typical latency
    avg_response_time_ms: Option<u64>,
}

impl ModelCapabilities {
    /// Describe a backend.
    pub fn new(
        modality: Modality,
        max_tokens: Option<u32>,
        supported_formats: &[&str],
        avg_response_time_ms: Option<u64>,
    ) -> Self {
        Self {
            modality,
            max_tokens,
            supported_formats: supported_formats.iter().map(|f| f.to_string()).collect(),
            avg_response_time_ms,
        }
    }
}
