//! Shared HTTP plumbing for provider clients.

use cineforge_error::{CineforgeError, HttpError, ProviderError, ProviderErrorKind};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Builds a client with the provider's request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, CineforgeError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)).into())
}

/// Maps a send failure to a provider error.
pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::new(ProviderErrorKind::Timeout {
            seconds: timeout_secs,
        })
    } else {
        ProviderError::new(ProviderErrorKind::Transport(e.to_string()))
    }
}

/// Pulls the most specific message out of an upstream error body.
///
/// Providers wrap messages as `{"error": {"message": ..}}`, `{"error": ..}`,
/// `{"detail": ..}` or plain text.
pub(crate) fn upstream_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    let candidates = [
        value.pointer("/error/message"),
        value.get("error"),
        value.get("detail"),
        value.get("message"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other if !other.is_object() => Some(other.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Checks the status and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::new(ProviderErrorKind::Http {
            status: status.as_u16(),
            message: upstream_message(&body),
        }));
    }
    response.json::<T>().await.map_err(|e| {
        ProviderError::new(ProviderErrorKind::MalformedResponse(format!(
            "Failed to parse response: {}",
            e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_error_message_wins() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "code": 429}}"#;
        assert_eq!(upstream_message(body), "Rate limit exceeded");
    }

    #[test]
    fn flat_detail_is_used() {
        assert_eq!(upstream_message(r#"{"detail": "Invalid key"}"#), "Invalid key");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(upstream_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
