//! OpenRouter client.

use crate::http::{build_client, read_json, send_error};
use crate::openrouter::dto::{ChatMessage, ChatRequest, ChatResponse, ModelInfo, ModelsResponse};
use crate::settings::OpenRouterSettings;
use async_trait::async_trait;
use cineforge_core::{
    GenerationOutput, GenerationParams, GenerationResult, ModelCapabilities, Modality, Usage,
};
use cineforge_error::{CineforgeResult, ProviderError, ProviderErrorKind};
use cineforge_interface::GenerationAdapter;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, instrument, warn};

/// Text generation through OpenRouter's chat-completions API.
///
/// One instance serves one model and credential.
#[derive(Debug, Clone)]
pub struct OpenRouterAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    settings: OpenRouterSettings,
}

impl OpenRouterAdapter {
    /// Creates a new OpenRouter adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential is empty
    /// - The HTTP client cannot be initialized
    #[instrument(skip_all, fields(model = %model.as_ref()))]
    pub fn new(
        api_key: impl Into<String>,
        model: impl AsRef<str>,
        settings: OpenRouterSettings,
    ) -> CineforgeResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::MissingCredential(
                "openrouter".to_string(),
            ))
            .into());
        }
        let client = build_client(*settings.timeout_secs())?;
        Ok(Self {
            client,
            api_key,
            model: model.as_ref().to_string(),
            settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url().trim_end_matches('/'), path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", self.settings.referer())
            .header("X-Title", self.settings.title())
    }

    /// Assemble the request body for `params`.
    pub fn chat_request(&self, params: &GenerationParams) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = params.system_prompt() {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(params.prompt().clone()));
        ChatRequest::new(
            self.model.clone(),
            messages,
            *params.temperature(),
            *params.max_tokens(),
            params.extra().clone(),
        )
    }

    /// Model catalogue. Empty when the catalogue cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        let response = match self.request(self.client.get(self.url("models"))).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Failed to fetch model catalogue");
                return Vec::new();
            }
        };
        match read_json::<ModelsResponse>(response).await {
            Ok(models) => models.data,
            Err(e) => {
                warn!(error = %e, "Failed to read model catalogue");
                Vec::new()
            }
        }
    }

    fn to_result(&self, response: ChatResponse) -> GenerationResult {
        let mut metadata = Map::new();
        if let Some(id) = &response.id {
            metadata.insert("id".to_string(), JsonValue::from(id.clone()));
        }
        if let Some(created) = response.created {
            metadata.insert("created".to_string(), JsonValue::from(created));
        }
        if let Some(reason) = response.finish_reason() {
            metadata.insert("finishReason".to_string(), JsonValue::from(reason));
        }
        GenerationResult {
            output: GenerationOutput::Text(response.first_text()),
            model: response.model.clone().unwrap_or_else(|| self.model.clone()),
            usage: response.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            metadata,
        }
    }
}

#[async_trait]
impl GenerationAdapter for OpenRouterAdapter {
    #[instrument(
        skip(self, params),
        fields(
            model = %self.model,
            temperature = *params.temperature(),
            max_tokens = *params.max_tokens(),
            prompt_len = params.prompt().len()
        )
    )]
    async fn generate(&self, params: &GenerationParams) -> CineforgeResult<GenerationResult> {
        let body = self.chat_request(params).to_body();
        let url = self.url("chat/completions");
        debug!(url = %url, "Sending OpenRouter request");

        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, *self.settings.timeout_secs()))?;

        let chat: ChatResponse = read_json(response).await?;
        let result = self.to_result(chat);
        debug!(
            total_tokens = result.usage.map(|u| u.total_tokens),
            "OpenRouter request completed"
        );
        Ok(result)
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities::new(
            Modality::Text,
            Some(*self.settings.max_tokens()),
            &["text"],
            Some(*self.settings.avg_response_time_ms()),
        )
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn validate(&self) -> bool {
        match self.request(self.client.get(self.url("models"))).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "OpenRouter validation failed");
                false
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "openrouter"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
