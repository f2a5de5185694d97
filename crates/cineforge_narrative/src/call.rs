//! Deadline-guarded text generation calls.

use cineforge_core::{GenerationOutput, GenerationParams};
use cineforge_error::{CineforgeResult, ProviderError, ProviderErrorKind};
use cineforge_interface::GenerationAdapter;
use std::time::Duration;

/// Runs one generation call under a deadline and returns its text.
///
/// Structured outputs are rendered back to JSON text so the JSON-consuming
/// stages can parse them the same way as free text. A deadline of zero
/// disables the guard.
///
/// # Errors
///
/// Propagates the adapter's provider error, returns
/// [`ProviderErrorKind::Timeout`] when the deadline passes and
/// [`ProviderErrorKind::MalformedResponse`] for media outputs.
#[tracing::instrument(
    skip(adapter, params),
    fields(
        provider = adapter.provider_name(),
        model = adapter.model_name(),
        prompt_len = params.prompt().len(),
    )
)]
pub async fn generate_text(
    adapter: &dyn GenerationAdapter,
    params: &GenerationParams,
    timeout_secs: u64,
) -> CineforgeResult<String> {
    let result = if timeout_secs == 0 {
        adapter.generate(params).await?
    } else {
        tokio::time::timeout(Duration::from_secs(timeout_secs), adapter.generate(params))
            .await
            .map_err(|_| {
                tracing::warn!(timeout_secs, "Generation call timed out");
                ProviderError::new(ProviderErrorKind::Timeout {
                    seconds: timeout_secs,
                })
            })??
    };

    match result.output {
        GenerationOutput::Text(text) => {
            tracing::debug!(response_len = text.len(), "Generation call completed");
            Ok(text)
        }
        GenerationOutput::Structured(value) => Ok(value.to_string()),
        GenerationOutput::Media { url, .. } => Err(ProviderError::new(
            ProviderErrorKind::MalformedResponse(format!(
                "Expected text output, got media at {}",
                url
            )),
        )
        .into()),
    }
}
