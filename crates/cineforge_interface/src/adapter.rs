//! Generation adapter contract.

use async_trait::async_trait;
use cineforge_core::{GenerationParams, GenerationResult, ModelCapabilities};
use cineforge_error::CineforgeResult;

/// Capability contract every generation backend implements.
///
/// One implementation exists per provider family; distinct model
/// identifiers share it through configuration. Implementations hold only
/// immutable configuration, so a single instance may serve concurrent
/// requests.
#[async_trait]
pub trait GenerationAdapter: Send + Sync {
    /// Submit one generation request.
    ///
    /// # Errors
    ///
    /// Returns a provider error carrying the upstream status and message on
    /// non-success responses, transport failures and malformed bodies.
    /// Never retries.
    async fn generate(&self, params: &GenerationParams) -> CineforgeResult<GenerationResult>;

    /// Static metadata about the backend. Makes no network call.
    fn capabilities(&self) -> ModelCapabilities;

    /// Lightweight reachability and credential check. Never fails.
    async fn validate(&self) -> bool;

    /// Provider family name (e.g., "openrouter", "falai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "anthropic/claude-3.5-sonnet").
    fn model_name(&self) -> &str;
}
