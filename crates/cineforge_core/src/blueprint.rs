//! The blueprint: creative constraints driving one story generation run.

use cineforge_error::{FieldViolation, InputError, InputErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Narrative perspective requested for the story.
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Narration {
    /// "I stood at the window..."
    FirstPerson,
    /// "You stand at the window..."
    SecondPerson,
    /// "She stood at the window..."
    ThirdPerson,
}

/// Inclusive word-count tolerance window of ±3% around a target.
///
/// The lower bound rounds down and the upper bound rounds up.
///
/// # Examples
///
/// ```
/// use cineforge_core::WordCountWindow;
///
/// let window = WordCountWindow::around(1000);
/// assert_eq!((window.min, window.max), (970, 1030));
/// assert!(window.contains(970));
/// assert!(!window.contains(1031));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCountWindow {
    /// Smallest accepted word count
    pub min: u32,
    /// Largest accepted word count
    pub max: u32,
}

impl WordCountWindow {
    /// Window for a target word count.
    pub fn around(target: u32) -> Self {
        let target = u64::from(target);
        let min = target * 97 / 100;
        let max = (target * 103).div_ceil(100);
        Self {
            min: min as u32,
            max: max as u32,
        }
    }

    /// Whether `count` falls inside the window.
    pub fn contains(&self, count: u32) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Immutable input contract for one narrative generation run.
///
/// Field names serialize in camelCase, matching the wire shape callers submit.
///
/// # Examples
///
/// ```
/// use cineforge_core::{Blueprint, Narration};
///
/// let blueprint = Blueprint::builder()
///     .core_idea("A lighthouse keeper finds a message in a bottle")
///     .genre("Drama")
///     .tone_mood("Melancholic")
///     .word_count(900u32)
///     .narration(Narration::ThirdPerson)
///     .scene_count(3u32)
///     .characters(vec!["Ava".to_string(), "Leo".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(blueprint.language_style(), "English, cinematic");
/// assert!(blueprint.validate().is_ok());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct Blueprint {
    /// Premise of the story, at least 10 characters
    core_idea: String,
    /// Genre label
    genre: String,
    /// Tone and mood label
    tone_mood: String,
    /// Target word count, 500 to 10000
    word_count: u32,
    /// Language and style directive
    #[serde(default = "default_language_style")]
    #[builder(default = "default_language_style()")]
    language_style: String,
    /// Narrative perspective
    narration: Narration,
    /// Exact number of scenes, 1 to 20
    scene_count: u32,
    /// Ordered roster of unique display names, 1 to 10 entries
    characters: Vec<String>,
    /// Optional free-text instructions appended to the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    custom_prompt: Option<String>,
    /// Identifier of the generation backend model
    #[serde(default = "default_selected_model")]
    #[builder(default = "default_selected_model()")]
    selected_model: String,
}

fn default_language_style() -> String {
    "English, cinematic".to_string()
}

fn default_selected_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

/// Bounds enforced by [`Blueprint::validate`].
const CORE_IDEA_MIN_CHARS: usize = 10;
const WORD_COUNT_RANGE: std::ops::RangeInclusive<u32> = 500..=10_000;
const SCENE_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
const CHARACTER_COUNT_RANGE: std::ops::RangeInclusive<usize> = 1..=10;

impl BlueprintBuilder {
    /// Build the blueprint.
    ///
    /// Only checks that required fields were set; call
    /// [`Blueprint::validate`] for the schema rules.
    ///
    /// # Errors
    ///
    /// Returns [`InputErrorKind::MissingField`] naming the first unset field.
    #[track_caller]
    pub fn build(&self) -> Result<Blueprint, InputError> {
        self.build_internal().map_err(|e| match e {
            BlueprintBuilderError::UninitializedField(field) => {
                InputError::new(InputErrorKind::MissingField(field.to_string()))
            }
            other => InputError::new(InputErrorKind::InvalidFields(vec![FieldViolation::new(
                "blueprint",
                other.to_string(),
            )])),
        })
    }
}

impl Blueprint {
    /// Creates a new blueprint builder.
    pub fn builder() -> BlueprintBuilder {
        BlueprintBuilder::default()
    }

    /// Accepted word-count window for stories built from this blueprint.
    pub fn word_count_window(&self) -> WordCountWindow {
        WordCountWindow::around(self.word_count)
    }

    /// Checks every schema rule and reports all violations at once.
    ///
    /// # Errors
    ///
    /// Returns [`InputErrorKind::InvalidFields`] listing each violated field.
    #[track_caller]
    pub fn validate(&self) -> Result<(), InputError> {
        let mut violations = Vec::new();

        if self.core_idea.trim().chars().count() < CORE_IDEA_MIN_CHARS {
            violations.push(FieldViolation::new(
                "coreIdea",
                format!("must be at least {} characters", CORE_IDEA_MIN_CHARS),
            ));
        }
        if self.genre.trim().is_empty() {
            violations.push(FieldViolation::new("genre", "must not be empty"));
        }
        if self.tone_mood.trim().is_empty() {
            violations.push(FieldViolation::new("toneMood", "must not be empty"));
        }
        if !WORD_COUNT_RANGE.contains(&self.word_count) {
            violations.push(FieldViolation::new(
                "wordCount",
                format!(
                    "must be between {} and {}",
                    WORD_COUNT_RANGE.start(),
                    WORD_COUNT_RANGE.end()
                ),
            ));
        }
        if !SCENE_COUNT_RANGE.contains(&self.scene_count) {
            violations.push(FieldViolation::new(
                "sceneCount",
                format!(
                    "must be between {} and {}",
                    SCENE_COUNT_RANGE.start(),
                    SCENE_COUNT_RANGE.end()
                ),
            ));
        }
        if !CHARACTER_COUNT_RANGE.contains(&self.characters.len()) {
            violations.push(FieldViolation::new(
                "characters",
                format!(
                    "must list between {} and {} names",
                    CHARACTER_COUNT_RANGE.start(),
                    CHARACTER_COUNT_RANGE.end()
                ),
            ));
        }
        if self.characters.iter().any(|name| name.trim().is_empty()) {
            violations.push(FieldViolation::new(
                "characters",
                "names must not be empty",
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self
            .characters
            .iter()
            .find(|name| !seen.insert(name.trim().to_lowercase()))
        {
            violations.push(FieldViolation::new(
                "characters",
                format!("duplicate name: {}", duplicate),
            ));
        }
        if self.selected_model.trim().is_empty() {
            violations.push(FieldViolation::new("selectedModel", "must not be empty"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(InputError::new(InputErrorKind::InvalidFields(violations)))
        }
    }

    /// Whether `name` is on the roster, ignoring case.
    pub fn has_character(&self, name: &str) -> bool {
        self.characters
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(name.trim()))
    }

    /// Same blueprint targeting a different model.
    pub fn with_selected_model(&self, model: impl Into<String>) -> Self {
        Self {
            selected_model: model.into(),
            ..self.clone()
        }
    }
}
