//! Constraint validator.
//!
//! Two tiers: a cheap, deterministic structural pass, and an optional
//! semantic pass that costs one generation call and only runs when the
//! structural pass found no hard error.

use crate::{
    StageSettings, call::generate_text, extraction::extract_json_object, prompt::compile_validation,
};
use cineforge_core::{Blueprint, Severity, StoryOutput, ValidationIssue, ValidationOutput};
use cineforge_error::{
    CineforgeResult, ConfigError, ConstraintViolation, ExtractionErrorKind, ViolationDetail,
};
use cineforge_interface::GenerationAdapter;
use regex::Regex;
use serde::Deserialize;
use std::str::FromStr;

/// Warning attached whenever the semantic report could not be read in full.
pub const MANUAL_REVIEW_WARNING: &str = "Could not fully validate - manual review recommended";

/// Word lists driving the soft style checks.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct StyleRules {
    /// Continuous-action verb forms flagged in scene text
    continuous_verbs: Vec<String>,
    /// Verbs that, right after a capitalized word, suggest a named character
    name_verbs: Vec<String>,
    /// Capitalized words never treated as character names
    name_stoplist: Vec<String>,
}

impl Default for StyleRules {
    fn default() -> Self {
        let words = |list: &[&str]| -> Vec<String> { list.iter().map(|w| w.to_string()).collect() };
        Self {
            continuous_verbs: words(&[
                "running", "walking", "climbing", "fighting", "chasing", "racing", "sprinting",
                "rushing",
            ]),
            name_verbs: words(&["says", "thinks", "is", "was", "stood", "sat"]),
            name_stoplist: words(&[
                "The", "A", "An", "He", "She", "It", "They", "We", "I", "You", "This", "That",
                "There", "Here", "His", "Her", "Their", "Its", "Our", "Everything", "Nothing",
                "Everyone", "Nobody", "Someone", "Something", "What", "Who", "Where", "When",
                "Time", "Silence", "Night", "Morning", "Dawn", "Dusk", "Today",
                "Tomorrow", "Yesterday", "Now", "Then", "Outside", "Inside", "Above", "Below",
            ]),
        }
    }
}

/// Structural and semantic validation against a blueprint.
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    continuous_verbs: Option<Regex>,
    name_pattern: Option<Regex>,
    name_stoplist: Vec<String>,
}

impl ConstraintValidator {
    /// Validator using the given style rules.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a rule list cannot be compiled.
    pub fn new(rules: StyleRules) -> CineforgeResult<Self> {
        Ok(Self {
            continuous_verbs: word_alternation(&rules.continuous_verbs, "(?i)\\b(", ")\\b")?,
            name_pattern: word_alternation(&rules.name_verbs, "\\b([A-Z][a-z]+) (?:", ")\\b")?,
            name_stoplist: rules.name_stoplist,
        })
    }

    /// Validator using [`StyleRules::default`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the default rules cannot be compiled.
    pub fn with_default_rules() -> CineforgeResult<Self> {
        Self::new(StyleRules::default())
    }

    /// Structural pass over a full story: scene count, word-count window and
    /// the soft style checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_core::{Blueprint, Narration, StoryOutput};
    /// use cineforge_narrative::ConstraintValidator;
    ///
    /// let blueprint = Blueprint::builder()
    ///     .core_idea("A lighthouse keeper finds a message in a bottle")
    ///     .genre("Drama")
    ///     .tone_mood("Melancholic")
    ///     .word_count(1000u32)
    ///     .narration(Narration::ThirdPerson)
    ///     .scene_count(2u32)
    ///     .characters(vec!["Ava".to_string()])
    ///     .build()
    ///     .unwrap();
    /// let mut story = StoryOutput::from_scenes("T", "C", vec!["a".into(), "b".into()]);
    /// story.word_count_actual = 969;
    ///
    /// let validator = ConstraintValidator::with_default_rules().unwrap();
    /// let report = validator.validate_story(&blueprint, &story);
    /// assert!(!report.is_valid());
    /// assert_eq!(report.errors()[0].field, "wordCount");
    /// ```
    pub fn validate_story(&self, blueprint: &Blueprint, story: &StoryOutput) -> ValidationOutput {
        let mut errors = Vec::new();
        errors.extend(scene_count_issue(blueprint, story.scenes.len()));
        errors.extend(word_count_issue(blueprint, story.word_count_actual));
        let report = ValidationOutput::new(errors, self.style_warnings(blueprint, &story.scenes));
        log_report("story", &report);
        report
    }

    /// Structural pass over an edited scene list: scene count and the soft
    /// style checks.
    pub fn validate_scenes(&self, blueprint: &Blueprint, scenes: &[String]) -> ValidationOutput {
        let errors = scene_count_issue(blueprint, scenes.len())
            .into_iter()
            .collect();
        let report = ValidationOutput::new(errors, self.style_warnings(blueprint, scenes));
        log_report("scenes", &report);
        report
    }

    /// Full edit validation: structural pass, then the semantic pass when
    /// the structural pass found no hard error.
    ///
    /// # Errors
    ///
    /// Only the semantic pass's generation call can fail; an unreadable
    /// report never does.
    #[tracing::instrument(
        skip_all,
        fields(
            scene_count = candidate.len(),
            provider = adapter.provider_name(),
        )
    )]
    pub async fn validate_edit(
        &self,
        adapter: &dyn GenerationAdapter,
        blueprint: &Blueprint,
        original: &[String],
        candidate: &[String],
        settings: &StageSettings,
    ) -> CineforgeResult<ValidationOutput> {
        let structural = self.validate_scenes(blueprint, candidate);
        if !structural.is_valid() {
            tracing::info!("Structural pass failed, skipping semantic pass");
            return Ok(structural);
        }

        let prompt = compile_validation(blueprint, original, candidate);
        let response = generate_text(
            adapter,
            &prompt.to_params(settings.validation()),
            *settings.call_timeout_secs(),
        )
        .await?;

        let semantic = parse_validation_response(&response);
        log_report("semantic", &semantic);
        Ok(structural.merge(semantic))
    }

    fn style_warnings(&self, blueprint: &Blueprint, scenes: &[String]) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(verbs) = &self.continuous_verbs {
            for (index, scene) in scenes.iter().enumerate() {
                let mut found: Vec<String> = Vec::new();
                for m in verbs.find_iter(scene) {
                    let verb = m.as_str().to_lowercase();
                    if !found.contains(&verb) {
                        found.push(verb);
                    }
                }
                if !found.is_empty() {
                    warnings.push(format!(
                        "Scene {} uses continuous action verbs (use static imagery): {}",
                        index + 1,
                        found.join(", ")
                    ));
                }
            }
        }

        if let Some(pattern) = &self.name_pattern {
            let mut unknown: Vec<&str> = Vec::new();
            for scene in scenes {
                for captures in pattern.captures_iter(scene) {
                    let Some(name) = captures.get(1).map(|m| m.as_str()) else {
                        continue;
                    };
                    if self.name_stoplist.iter().any(|s| s == name)
                        || is_roster_name(blueprint, name)
                        || unknown.contains(&name)
                    {
                        continue;
                    }
                    unknown.push(name);
                }
            }
            if !unknown.is_empty() {
                warnings.push(format!(
                    "Potential new characters detected: {}. Please verify only blueprint characters are used.",
                    unknown.join(", ")
                ));
            }
        }

        warnings
    }
}

fn word_alternation(words: &[String], prefix: &str, suffix: &str) -> CineforgeResult<Option<Regex>> {
    let words: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return Ok(None);
    }
    let pattern = format!("{}{}{}", prefix, words.join("|"), suffix);
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| ConfigError::new(format!("Invalid style rule pattern: {}", e)).into())
}

/// Whether `name` is a roster entry or the first word of one ("Ava" for "Ava Stone").
fn is_roster_name(blueprint: &Blueprint, name: &str) -> bool {
    blueprint.has_character(name)
        || blueprint.characters().iter().any(|character| {
            character
                .split_whitespace()
                .any(|part| part.eq_ignore_ascii_case(name))
        })
}

fn log_report(pass: &str, report: &ValidationOutput) {
    if report.is_valid() {
        tracing::debug!(
            pass,
            soft = report.soft_errors().count(),
            warnings = report.warnings().len(),
            "Validation passed"
        );
    } else {
        tracing::warn!(
            pass,
            hard = report.hard_errors().count(),
            "Validation found hard errors"
        );
    }
}

/// Hard error when the scene count differs from the blueprint.
pub fn scene_count_issue(blueprint: &Blueprint, actual: usize) -> Option<ValidationIssue> {
    let expected = *blueprint.scene_count() as usize;
    (actual != expected).then(|| {
        ValidationIssue::hard(
            "sceneCount",
            format!(
                "Scene count mismatch: expected {}, got {}",
                expected, actual
            ),
        )
    })
}

/// Hard error when the word count falls outside the ±3% window.
pub fn word_count_issue(blueprint: &Blueprint, actual: u32) -> Option<ValidationIssue> {
    let window = blueprint.word_count_window();
    (!window.contains(actual)).then(|| {
        ValidationIssue::hard(
            "wordCount",
            format!(
                "Word count out of range: expected {}-{}, got {}",
                window.min, window.max, actual
            ),
        )
    })
}

/// Hard findings of a report as a constraint violation, if there are any.
pub fn constraint_violation(report: &ValidationOutput) -> Option<ConstraintViolation> {
    let details: Vec<ViolationDetail> = report
        .hard_errors()
        .map(|issue| ViolationDetail::new(&issue.field, &issue.message, issue.scene_index))
        .collect();
    (!details.is_empty()).then(|| ConstraintViolation::new(details))
}

#[derive(Debug, Deserialize)]
struct ReportWire {
    #[serde(default)]
    errors: Vec<IssueWire>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueWire {
    #[serde(default, rename = "type", alias = "severity")]
    severity: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    scene_index: Option<usize>,
}

impl From<IssueWire> for ValidationIssue {
    fn from(wire: IssueWire) -> Self {
        let severity = wire
            .severity
            .as_deref()
            .and_then(|s| Severity::from_str(s.trim()).ok())
            .unwrap_or(Severity::Soft);
        ValidationIssue {
            severity,
            field: wire.field.unwrap_or_else(|| "general".to_string()),
            message: wire.message,
            scene_index: wire.scene_index,
        }
    }
}

/// Read the semantic validator's answer. Never fails.
///
/// - A JSON report is read leniently: unknown severities count as soft,
///   a missing field is "general". Validity is recomputed from the
///   findings, whatever `isValid` the model claimed.
/// - Without any JSON, the words "error" or "violation" anywhere in the
///   text produce a soft finding; either way a manual-review warning is
///   attached.
/// - An unreadable JSON report degrades to valid with the manual-review
///   warning.
///
/// # Examples
///
/// ```
/// use cineforge_narrative::{MANUAL_REVIEW_WARNING, parse_validation_response};
///
/// let report = parse_validation_response(
///     r#"Result: {"isValid": true, "errors": [{"type": "hard", "field": "characters", "message": "Mara is new"}], "warnings": []}"#,
/// );
/// assert!(!report.is_valid());
///
/// let report = parse_validation_response("Looks consistent.");
/// assert!(report.is_valid());
/// assert_eq!(report.warnings(), &[MANUAL_REVIEW_WARNING.to_string()]);
/// ```
pub fn parse_validation_response(response: &str) -> ValidationOutput {
    match extract_json_object(response) {
        Ok(json) => match serde_json::from_str::<ReportWire>(&json) {
            Ok(report) => ValidationOutput::new(
                report.errors.into_iter().map(ValidationIssue::from).collect(),
                report.warnings,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable validation report");
                manual_review()
            }
        },
        Err(e) if e.kind == ExtractionErrorKind::NoJson => keyword_heuristic(response),
        Err(e) => {
            tracing::warn!(error = %e, "Validation report could not be extracted");
            manual_review()
        }
    }
}

fn manual_review() -> ValidationOutput {
    ValidationOutput::new(Vec::new(), vec![MANUAL_REVIEW_WARNING.to_string()])
}

fn keyword_heuristic(response: &str) -> ValidationOutput {
    let lower = response.to_lowercase();
    let errors = if lower.contains("error") || lower.contains("violation") {
        vec![ValidationIssue::soft(
            "general",
            "Please review the scenes for potential issues",
        )]
    } else {
        Vec::new()
    };
    ValidationOutput::new(errors, vec![MANUAL_REVIEW_WARNING.to_string()])
}
