//! Layered configuration.
//!
//! Sources, later ones overriding earlier:
//! 1. Bundled defaults (`cineforge.toml` shipped with the library)
//! 2. `~/.config/cineforge/cineforge.toml`
//! 3. `./cineforge.toml`
//! 4. `CINEFORGE__<SECTION>__<KEY>` environment variables
//!
//! User files and variables are optional and skipped when absent.

use crate::telemetry::TelemetryConfig;
use cineforge_cache::InstanceCacheConfig;
use cineforge_error::{CineforgeError, CineforgeResult, ConfigError};
use cineforge_models::ProviderSettings;
use cineforge_narrative::StageSettings;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../cineforge.toml");

/// Where project records live.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on exit
    #[default]
    Memory,
    /// One JSON document per record under `path`
    Filesystem,
}

/// Record store selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StorageConfig {
    /// Backend kind
    #[serde(default)]
    backend: StorageBackend,
    /// Root directory for the filesystem backend
    #[serde(default = "default_storage_path")]
    path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".cineforge/records")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Filesystem storage rooted at `path`.
    pub fn filesystem(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            path: path.into(),
        }
    }
}

/// Top-level Cineforge configuration.
///
/// # Example
///
/// ```no_run
/// use cineforge::CineforgeConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CineforgeConfig::load()?;
/// println!("Story tokens: {}", config.stages().story().max_tokens);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct CineforgeConfig {
    /// Provider connection settings
    #[serde(default)]
    providers: ProviderSettings,
    /// Per-stage generation settings and the call deadline
    #[serde(default)]
    stages: StageSettings,
    /// Adapter cache
    #[serde(default)]
    cache: InstanceCacheConfig,
    /// Record store
    #[serde(default)]
    storage: StorageConfig,
    /// Logging
    #[serde(default)]
    telemetry: TelemetryConfig,
}

fn config_error(context: &str, e: config::ConfigError) -> CineforgeError {
    ConfigError::new(format!("{}: {}", context, e)).into()
}

fn finish(builder: ConfigBuilder<DefaultState>) -> CineforgeResult<CineforgeConfig> {
    builder
        .build()
        .map_err(|e| config_error("Failed to build configuration", e))?
        .try_deserialize()
        .map_err(|e| config_error("Failed to parse configuration", e))
}

fn defaults() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

impl CineforgeConfig {
    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bundled file does not parse.
    pub fn bundled() -> CineforgeResult<Self> {
        finish(defaults())
    }

    /// Bundled defaults overlaid with a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either document fails to parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge::CineforgeConfig;
    ///
    /// let config = CineforgeConfig::from_toml_str("[stages]\ncall_timeout_secs = 30\n").unwrap();
    /// assert_eq!(*config.stages().call_timeout_secs(), 30);
    /// assert_eq!(config.stages().story().max_tokens, 6000);
    /// ```
    pub fn from_toml_str(toml: &str) -> CineforgeResult<Self> {
        finish(defaults().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    /// Bundled defaults overlaid with one file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CineforgeResult<Self> {
        debug!("Loading configuration from file");
        finish(defaults().add_source(File::from(path.as_ref())))
    }

    /// Every source, in precedence order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any present source fails to parse.
    #[instrument]
    pub fn load() -> CineforgeResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder = defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cineforge/cineforge.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("cineforge").required(false))
            .add_source(
                Environment::with_prefix("CINEFORGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        finish(builder)
    }

    /// Same configuration with different stage settings.
    pub fn with_stages(mut self, stages: StageSettings) -> Self {
        self.stages = stages;
        self
    }

    /// Same configuration with different storage.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }
}
