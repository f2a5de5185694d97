//! Configuration-keyed adapter factory.

use crate::falai::FalAiAdapter;
use crate::openrouter::OpenRouterAdapter;
use crate::settings::ProviderSettings;
use cineforge_cache::{ConfigKey, InstanceCache, InstanceCacheConfig};
use cineforge_core::Modality;
use cineforge_error::{CineforgeResult, FieldViolation, InputError, InputErrorKind};
use cineforge_interface::GenerationAdapter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Provider families with an adapter implementation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdapterFamily {
    /// OpenRouter chat completions
    OpenRouter,
    /// FAL media endpoints
    FalAi,
}

/// Names accepted by [`AdapterConfig::preset`].
pub const PRESETS: &[&str] = &[
    "openrouter",
    "claude",
    "gpt",
    "gemini",
    "falai",
    "falai-video",
    "falai-audio",
];

fn preset_parts(name: &str) -> Option<(AdapterFamily, Option<&'static str>, Modality)> {
    let parts = match name {
        "openrouter" => (AdapterFamily::OpenRouter, None, Modality::Text),
        "claude" => (
            AdapterFamily::OpenRouter,
            Some("anthropic/claude-3-5-sonnet"),
            Modality::Text,
        ),
        "gpt" => (AdapterFamily::OpenRouter, Some("openai/gpt-4o"), Modality::Text),
        "gemini" => (
            AdapterFamily::OpenRouter,
            Some("google/gemini-2.0-flash-exp"),
            Modality::Text,
        ),
        "falai" => (AdapterFamily::FalAi, None, Modality::Image),
        "falai-video" => (AdapterFamily::FalAi, None, Modality::Video),
        "falai-audio" => (AdapterFamily::FalAi, None, Modality::Audio),
        _ => return None,
    };
    Some(parts)
}

/// Which adapter to build, for which model, with which credential.
///
/// The credential is supplied per call so concurrent callers can use
/// different accounts and models.
#[derive(Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct AdapterConfig {
    /// Provider family
    family: AdapterFamily,
    /// Model or endpoint; the family default when unset
    #[builder(default, setter(into, strip_option))]
    model: Option<String>,
    /// Output modality
    #[builder(default)]
    modality: Modality,
    /// Provider credential
    credential: String,
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("family", &self.family)
            .field("model", &self.model)
            .field("modality", &self.modality)
            .field("credential", &"<redacted>")
            .finish()
    }
}

impl AdapterConfig {
    /// Creates a new config builder.
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }

    /// Text generation through OpenRouter.
    pub fn openrouter(model: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            family: AdapterFamily::OpenRouter,
            model: Some(model.into()),
            modality: Modality::Text,
            credential: credential.into(),
        }
    }

    /// Media generation through FAL with the default endpoint for `modality`.
    pub fn falai(modality: Modality, credential: impl Into<String>) -> Self {
        Self {
            family: AdapterFamily::FalAi,
            model: None,
            modality,
            credential: credential.into(),
        }
    }

    /// Configuration for one of the named [`PRESETS`].
    ///
    /// # Errors
    ///
    /// Returns an input error for unknown preset names.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_models::{AdapterConfig, AdapterFamily};
    ///
    /// let config = AdapterConfig::preset("gpt", "sk-test").unwrap();
    /// assert_eq!(*config.family(), AdapterFamily::OpenRouter);
    /// assert_eq!(config.model().as_deref(), Some("openai/gpt-4o"));
    /// assert!(AdapterConfig::preset("dalle", "sk-test").is_err());
    /// ```
    #[track_caller]
    pub fn preset(name: &str, credential: impl Into<String>) -> Result<Self, InputError> {
        let (family, model, modality) = preset_parts(name).ok_or_else(|| {
            InputError::new(InputErrorKind::InvalidFields(vec![FieldViolation::new(
                "preset",
                format!("unknown preset '{}', expected one of {}", name, PRESETS.join(", ")),
            )]))
        })?;
        Ok(Self {
            family,
            model: model.map(str::to_string),
            modality,
            credential: credential.into(),
        })
    }

    /// Same configuration with a different credential.
    pub fn with_credential(&self, credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            ..self.clone()
        }
    }
}

/// Resolves configurations to shared adapter instances.
///
/// Owns the adapter cache; repeated requests for the same family, model,
/// modality and credential reuse one client. Call [`clear_cache`] to reset.
///
/// [`clear_cache`]: AdapterFactory::clear_cache
pub struct AdapterFactory {
    settings: ProviderSettings,
    cache: InstanceCache<Arc<dyn GenerationAdapter>>,
}

impl AdapterFactory {
    /// Create a factory with provider settings and cache configuration.
    pub fn new(settings: ProviderSettings, cache_config: InstanceCacheConfig) -> Self {
        Self {
            settings,
            cache: InstanceCache::new(cache_config),
        }
    }

    /// Provider settings.
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Model or endpoint the configuration resolves to.
    pub fn resolved_model(&self, config: &AdapterConfig) -> String {
        if let Some(model) = config.model() {
            return model.clone();
        }
        match (config.family(), config.modality()) {
            (AdapterFamily::OpenRouter, _) => self.settings.openrouter().default_model().clone(),
            (AdapterFamily::FalAi, Modality::Video) => {
                self.settings.falai().video_endpoint().clone()
            }
            (AdapterFamily::FalAi, Modality::Audio) => {
                self.settings.falai().audio_endpoint().clone()
            }
            (AdapterFamily::FalAi, _) => self.settings.falai().image_endpoint().clone(),
        }
    }

    fn cache_key(&self, config: &AdapterConfig) -> ConfigKey {
        ConfigKey::new(
            &config.family().to_string(),
            &self.resolved_model(config),
            &config.modality().to_string(),
            config.credential(),
        )
    }

    #[track_caller]
    fn require_credential(config: &AdapterConfig) -> Result<(), InputError> {
        if config.credential().trim().is_empty() {
            return Err(InputError::new(InputErrorKind::MissingField(
                "credential".to_string(),
            )));
        }
        Ok(())
    }

    /// Shared adapter for `config`, built on first use.
    ///
    /// # Errors
    ///
    /// Returns an input error when the credential is empty, or the adapter's
    /// construction error.
    #[instrument(skip(self), fields(cached = self.cache.len()))]
    pub fn adapter(&self, config: &AdapterConfig) -> CineforgeResult<Arc<dyn GenerationAdapter>> {
        Self::require_credential(config)?;
        let key = self.cache_key(config);
        self.cache
            .get_or_try_insert_with(key, || self.create(config))
    }

    /// Build a fresh adapter, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an input error when the credential is empty, or the adapter's
    /// construction error.
    pub fn create(&self, config: &AdapterConfig) -> CineforgeResult<Arc<dyn GenerationAdapter>> {
        Self::require_credential(config)?;
        let model = self.resolved_model(config);
        debug!(family = %config.family(), model = %model, "Building adapter");
        let adapter: Arc<dyn GenerationAdapter> = match config.family() {
            AdapterFamily::OpenRouter => Arc::new(OpenRouterAdapter::new(
                config.credential().clone(),
                &model,
                self.settings.openrouter().clone(),
            )?),
            AdapterFamily::FalAi => Arc::new(FalAiAdapter::new(
                config.credential().clone(),
                *config.modality(),
                Some(model),
                self.settings.falai().clone(),
            )?),
        };
        Ok(adapter)
    }

    /// Pre-seed the cache with an adapter for `config`.
    pub fn insert(&self, config: &AdapterConfig, adapter: Arc<dyn GenerationAdapter>) {
        self.cache.insert(self.cache_key(config), adapter);
    }

    /// Drop every cached adapter.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached adapters.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::new(ProviderSettings::default(), InstanceCacheConfig::default())
    }
}
