//! FAL client for image, video and audio generation.

use crate::http::{build_client, read_json, send_error};
use crate::settings::FalAiSettings;
use async_trait::async_trait;
use cineforge_core::{
    GenerationOutput, GenerationParams, GenerationResult, ModelCapabilities, Modality,
};
use cineforge_error::{
    CineforgeResult, InputError, InputErrorKind, ProviderError, ProviderErrorKind,
};
use cineforge_interface::GenerationAdapter;
use serde_json::{Map, Value as JsonValue, json};
use tracing::{debug, instrument};

/// Media generation through FAL's synchronous endpoints.
///
/// Each instance is bound to one modality and endpoint. Payload defaults
/// per modality can be overridden with passthrough parameters.
#[derive(Debug, Clone)]
pub struct FalAiAdapter {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    modality: Modality,
    settings: FalAiSettings,
}

impl FalAiAdapter {
    /// Creates a new FAL adapter.
    ///
    /// `endpoint` defaults to the configured endpoint for `modality`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The modality is text
    /// - The credential is empty
    /// - The HTTP client cannot be initialized
    #[instrument(skip_all, fields(modality = %modality))]
    pub fn new(
        api_key: impl Into<String>,
        modality: Modality,
        endpoint: Option<String>,
        settings: FalAiSettings,
    ) -> CineforgeResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::MissingCredential(
                "falai".to_string(),
            ))
            .into());
        }
        let endpoint = match (endpoint, modality) {
            (Some(endpoint), _) => endpoint,
            (None, Modality::Image) => settings.image_endpoint().clone(),
            (None, Modality::Video) => settings.video_endpoint().clone(),
            (None, Modality::Audio) => settings.audio_endpoint().clone(),
            (None, Modality::Text) => {
                return Err(ProviderError::new(ProviderErrorKind::UnsupportedModality(
                    "falai does not generate text".to_string(),
                ))
                .into());
            }
        };
        let client = build_client(*settings.timeout_secs())?;
        Ok(Self {
            client,
            api_key,
            endpoint,
            modality,
            settings,
        })
    }

    /// Modality this instance generates.
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Request body for `params`, defaults first and passthrough keys last.
    ///
    /// # Errors
    ///
    /// Video requests need an `image_url` passthrough parameter.
    pub fn payload(&self, params: &GenerationParams) -> CineforgeResult<JsonValue> {
        let mut body = match self.modality {
            Modality::Image => json!({
                "prompt": params.prompt(),
                "image_size": {"width": 1024, "height": 1024},
                "num_inference_steps": 28,
                "guidance_scale": 3.5,
                "num_images": 1,
                "enable_safety_checker": true,
            }),
            Modality::Video => {
                if params.extra_value("image_url").is_none() {
                    return Err(InputError::new(InputErrorKind::MissingField(
                        "image_url".to_string(),
                    ))
                    .into());
                }
                json!({
                    "prompt": params.prompt(),
                    "duration": 5,
                    "ratio": "16:9",
                })
            }
            Modality::Audio => json!({
                "text": params.prompt(),
                "voice": "af_bella",
            }),
            Modality::Text => {
                return Err(ProviderError::new(ProviderErrorKind::UnsupportedModality(
                    "text".to_string(),
                ))
                .into());
            }
        };
        if let Some(object) = body.as_object_mut() {
            for (key, value) in params.extra() {
                object.insert(key.clone(), value.clone());
            }
        }
        Ok(body)
    }

    /// Generate one image.
    pub async fn generate_image(
        &self,
        prompt: &str,
        seed: Option<u64>,
    ) -> CineforgeResult<GenerationResult> {
        let mut params = GenerationParams::new(prompt);
        if let Some(seed) = seed {
            params = params.with_extra("seed", json!(seed));
        }
        self.generate_as(Modality::Image, &params).await
    }

    /// Animate a still image into a short clip.
    pub async fn generate_video(
        &self,
        prompt: &str,
        image_url: &str,
    ) -> CineforgeResult<GenerationResult> {
        let params = GenerationParams::new(prompt).with_extra("image_url", json!(image_url));
        self.generate_as(Modality::Video, &params).await
    }

    /// Synthesize narration audio.
    pub async fn generate_audio(
        &self,
        text: &str,
        voice: Option<&str>,
    ) -> CineforgeResult<GenerationResult> {
        let mut params = GenerationParams::new(text);
        if let Some(voice) = voice {
            params = params.with_extra("voice", json!(voice));
        }
        self.generate_as(Modality::Audio, &params).await
    }

    async fn generate_as(
        &self,
        modality: Modality,
        params: &GenerationParams,
    ) -> CineforgeResult<GenerationResult> {
        if self.modality != modality {
            return Err(ProviderError::new(ProviderErrorKind::UnsupportedModality(format!(
                "adapter generates {}, not {}",
                self.modality, modality
            )))
            .into());
        }
        self.generate(params).await
    }

    /// Extract the media handle and metadata from a response body.
    pub fn interpret(&self, body: JsonValue) -> GenerationResult {
        let media = |pointer: &str, mime_pointer: &str| {
            body.pointer(pointer)
                .and_then(JsonValue::as_str)
                .map(|url| GenerationOutput::Media {
                    url: url.to_string(),
                    mime: body
                        .pointer(mime_pointer)
                        .and_then(JsonValue::as_str)
                        .map(str::to_string),
                })
        };
        let output = match self.modality {
            Modality::Image => media("/images/0/url", "/images/0/content_type"),
            Modality::Video => media("/video/url", "/video/content_type"),
            Modality::Audio => media("/audio/url", "/audio/content_type")
                .or_else(|| media("/audio_url", "/audio/content_type")),
            Modality::Text => None,
        }
        .unwrap_or_else(|| GenerationOutput::Structured(body.clone()));

        let mut metadata = Map::new();
        for (source, target) in [
            ("seed", "seed"),
            ("timings", "timings"),
            ("has_nsfw_concepts", "hasNsfwConcepts"),
        ] {
            if let Some(value) = body.get(source) {
                metadata.insert(target.to_string(), value.clone());
            }
        }

        GenerationResult {
            output,
            model: self.endpoint.clone(),
            usage: None,
            metadata,
        }
    }
}

#[async_trait]
impl GenerationAdapter for FalAiAdapter {
    #[instrument(skip(self, params), fields(endpoint = %self.endpoint, modality = %self.modality))]
    async fn generate(&self, params: &GenerationParams) -> CineforgeResult<GenerationResult> {
        let body = self.payload(params)?;
        let url = format!(
            "{}/{}",
            self.settings.base_url().trim_end_matches('/'),
            self.endpoint
        );
        debug!(url = %url, "Sending FAL request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, *self.settings.timeout_secs()))?;

        let body: JsonValue = read_json(response).await?;
        Ok(self.interpret(body))
    }

    fn capabilities(&self) -> ModelCapabilities {
        match self.modality {
            Modality::Image => ModelCapabilities::new(Modality::Image, None, &["png", "jpg"], Some(8000)),
            Modality::Video => ModelCapabilities::new(Modality::Video, None, &["mp4"], Some(45000)),
            Modality::Audio => {
                ModelCapabilities::new(Modality::Audio, None, &["mp3", "wav"], Some(3000))
            }
            Modality::Text => ModelCapabilities::new(Modality::Text, None, &[], None),
        }
    }

    async fn validate(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn provider_name(&self) -> &'static str {
        "falai"
    }

    fn model_name(&self) -> &str {
        &self.endpoint
    }
}
