//! Provider connection settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// OpenRouter connection settings.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_", into)]
pub struct OpenRouterSettings {
    /// API root
    #[serde(default = "default_openrouter_url")]
    base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_openrouter_timeout")]
    timeout_secs: u64,
    /// Value of the HTTP-Referer attribution header
    #[serde(default = "default_referer")]
    referer: String,
    /// Value of the X-Title attribution header
    #[serde(default = "default_title")]
    title: String,
    /// Model used when a configuration names none
    #[serde(default = "default_model")]
    default_model: String,
    /// Advertised response token ceiling
    #[serde(default = "default_capability_tokens")]
    max_tokens: u32,
    /// Advertised typical latency
    #[serde(default = "default_text_latency")]
    avg_response_time_ms: u64,
}

fn default_openrouter_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_openrouter_timeout() -> u64 {
    120
}

fn default_referer() -> String {
    "http://localhost:3000".to_string()
}

fn default_title() -> String {
    "Cine-AI".to_string()
}

fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_capability_tokens() -> u32 {
    8000
}

fn default_text_latency() -> u64 {
    5000
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            base_url: default_openrouter_url(),
            timeout_secs: default_openrouter_timeout(),
            referer: default_referer(),
            title: default_title(),
            default_model: default_model(),
            max_tokens: default_capability_tokens(),
            avg_response_time_ms: default_text_latency(),
        }
    }
}

/// FAL connection settings.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_", into)]
pub struct FalAiSettings {
    /// API root
    #[serde(default = "default_falai_url")]
    base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_falai_timeout")]
    timeout_secs: u64,
    /// Default image endpoint
    #[serde(default = "default_image_endpoint")]
    image_endpoint: String,
    /// Default image-to-video endpoint
    #[serde(default = "default_video_endpoint")]
    video_endpoint: String,
    /// Default text-to-speech endpoint
    #[serde(default = "default_audio_endpoint")]
    audio_endpoint: String,
}

fn default_falai_url() -> String {
    "https://fal.run".to_string()
}

fn default_falai_timeout() -> u64 {
    300
}

fn default_image_endpoint() -> String {
    "fal-ai/flux/dev".to_string()
}

fn default_video_endpoint() -> String {
    "fal-ai/runway-gen3/turbo/image-to-video".to_string()
}

fn default_audio_endpoint() -> String {
    "fal-ai/kokoro-tts".to_string()
}

impl Default for FalAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_falai_url(),
            timeout_secs: default_falai_timeout(),
            image_endpoint: default_image_endpoint(),
            video_endpoint: default_video_endpoint(),
            audio_endpoint: default_audio_endpoint(),
        }
    }
}

/// Settings for every provider family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ProviderSettings {
    /// OpenRouter settings
    #[serde(default)]
    openrouter: OpenRouterSettings,
    /// FAL settings
    #[serde(default)]
    falai: FalAiSettings,
}

impl ProviderSettings {
    /// Settings from explicit per-family values.
    pub fn new(openrouter: OpenRouterSettings, falai: FalAiSettings) -> Self {
        Self { openrouter, falai }
    }
}
