//! Tracing subscriber setup.

use cineforge_error::{CineforgeResult, ConfigError};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TelemetryConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_filter")]
    filter: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    json: bool,
}

fn default_filter() -> String {
    "info,cineforge=debug".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Config with an explicit filter directive.
    pub fn new(filter: impl Into<String>, json: bool) -> Self {
        Self {
            filter: filter.into(),
            json,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Returns `false` when a subscriber was already installed; that is not an
/// error, so tests and embedding hosts can call this freely.
///
/// # Errors
///
/// Returns a configuration error when the filter directive is invalid.
pub fn init_telemetry(config: &TelemetryConfig) -> CineforgeResult<bool> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter()).map_err(|e| {
            ConfigError::new(format!(
                "Invalid telemetry filter '{}': {}",
                config.filter(),
                e
            ))
        })?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if *config.json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = config.json(), "Telemetry initialized");
    }
    Ok(installed)
}
