//! Per-stage generation settings.

use serde::{Deserialize, Serialize};

/// Sampling settings for one kind of generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Sampling temperature
    pub temperature: f32,
    /// Response token ceiling
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Settings with the given temperature and token ceiling.
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Generation settings for every pipeline stage plus the per-call deadline.
///
/// # Examples
///
/// ```
/// use cineforge_narrative::{GenerationSettings, StageSettings};
///
/// let settings = StageSettings::default()
///     .with_validation(GenerationSettings::new(0.1, 1000))
///     .with_call_timeout_secs(30u64);
///
/// assert_eq!(settings.validation().max_tokens, 1000);
/// assert_eq!(settings.story().temperature, 0.7);
/// assert_eq!(*settings.call_timeout_secs(), 30);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct StageSettings {
    /// Full story generation
    story: GenerationSettings,
    /// Single scene rewrite
    regeneration: GenerationSettings,
    /// Semantic validation pass
    validation: GenerationSettings,
    /// Character profiles
    character: GenerationSettings,
    /// Shot blueprints
    shot: GenerationSettings,
    /// Background blueprints
    background: GenerationSettings,
    /// Deadline applied to every adapter call
    #[setters(into)]
    call_timeout_secs: u64,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            story: GenerationSettings::new(0.7, 6000),
            regeneration: GenerationSettings::new(0.7, 2000),
            validation: GenerationSettings::new(0.3, 2000),
            character: GenerationSettings::new(0.7, 4000),
            shot: GenerationSettings::new(0.6, 4000),
            background: GenerationSettings::new(0.7, 4000),
            call_timeout_secs: 180,
        }
    }
}
