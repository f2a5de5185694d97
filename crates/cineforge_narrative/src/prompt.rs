//! Prompt compiler.
//!
//! Every function here is pure: the same input always renders the same
//! prompt. Variability only enters through the sampling settings handed to
//! the adapter.

use crate::{GenerationSettings, system_prompts};
use cineforge_core::{Blueprint, CameraView, GenerationParams, ShotType};
use strum::IntoEnumIterator;

/// System instruction plus user prompt for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPrompt {
    /// Fixed instruction for the stage
    pub system_prompt: String,
    /// Rendered request
    pub user_prompt: String,
}

impl CompiledPrompt {
    fn new(system_prompt: &str, user_prompt: String) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            user_prompt,
        }
    }

    /// Generation params carrying this prompt and the given sampling settings.
    pub fn to_params(&self, settings: &GenerationSettings) -> GenerationParams {
        GenerationParams::new(self.user_prompt.clone())
            .with_system_prompt(self.system_prompt.clone())
            .with_sampling(settings.temperature, settings.max_tokens)
    }
}

/// What a single-scene rewrite needs to know.
#[derive(Debug, Clone, Copy)]
pub struct SceneEditContext<'a> {
    /// Constraints the rewrite must keep
    pub blueprint: &'a Blueprint,
    /// 0-based scene being rewritten
    pub scene_index: usize,
    /// Scene text as currently stored
    pub current_scene: &'a str,
    /// Caller's free-text instructions
    pub instructions: &'a str,
}

/// Renders a blueprint into the full story generation prompt.
///
/// # Examples
///
/// ```
/// use cineforge_core::{Blueprint, Narration};
/// use cineforge_narrative::compile_story;
///
/// let blueprint = Blueprint::builder()
///     .core_idea("A lighthouse keeper finds a message in a bottle")
///     .genre("Drama")
///     .tone_mood("Melancholic")
///     .word_count(1000u32)
///     .narration(Narration::ThirdPerson)
///     .scene_count(4u32)
///     .characters(vec!["Ava".to_string()])
///     .build()
///     .unwrap();
///
/// let prompt = compile_story(&blueprint);
/// assert!(prompt.user_prompt.contains("970-1030 words"));
/// assert!(prompt.user_prompt.contains("Required Scene Count: 4 (EXACT)"));
/// ```
pub fn compile_story(blueprint: &Blueprint) -> CompiledPrompt {
    let window = blueprint.word_count_window();
    let mut lines = vec![
        "USER NARRATIVE BLUEPRINT:".to_string(),
        format!("- Core Idea: {}", blueprint.core_idea()),
        format!("- Genre: {}", blueprint.genre()),
        format!("- Tone & Mood: {}", blueprint.tone_mood()),
        format!(
            "- Target Word Count: {} words (±3% tolerance: {}-{} words)",
            blueprint.word_count(),
            window.min,
            window.max
        ),
        format!("- Language & Style: {}", blueprint.language_style()),
        format!("- Narration Perspective: {}", blueprint.narration()),
        format!(
            "- Required Scene Count: {} (EXACT)",
            blueprint.scene_count()
        ),
        format!(
            "- Characters (ONLY these may appear): {}",
            blueprint.characters().join(", ")
        ),
    ];
    if let Some(custom) = blueprint.custom_prompt()
        && !custom.trim().is_empty()
    {
        lines.push(format!("- Additional Instructions: {}", custom.trim()));
    }
    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "Generate a complete story following ALL constraints above. Remember:".to_string(),
        "- Use ONLY static imagery (frozen moments, poses, expressions)".to_string(),
        "- NO continuous action verbs".to_string(),
        "- Minimal, impactful dialogue".to_string(),
        "- Clear scene transitions".to_string(),
        format!(
            "- Exactly {} scenes, each introduced by \"Scene <number>:\"",
            blueprint.scene_count()
        ),
        format!(
            "- Word count between {} and {} words",
            window.min, window.max
        ),
    ]);

    CompiledPrompt::new(system_prompts::STORY_ARCHITECT, lines.join("\n"))
}

/// Renders the rewrite request for one scene.
///
/// Only the constraints that apply to a single scene are restated; the scene
/// number is 1-based in the text.
pub fn compile_scene_regeneration(context: &SceneEditContext<'_>) -> CompiledPrompt {
    let blueprint = context.blueprint;
    let lines = [
        format!(
            "You are rewriting Scene {} of {} of a cinematic story.",
            context.scene_index + 1,
            blueprint.scene_count()
        ),
        String::new(),
        "CONSTRAINTS:".to_string(),
        format!("- Genre: {}", blueprint.genre()),
        format!("- Tone: {}", blueprint.tone_mood()),
        format!(
            "- Characters (only these): {}",
            blueprint.characters().join(", ")
        ),
        format!("- Narration: {}", blueprint.narration()),
        format!("- Language & Style: {}", blueprint.language_style()),
        "- Use static imagery (frozen moments, poses)".to_string(),
        "- NO continuous action verbs".to_string(),
        "- Minimal dialogue".to_string(),
        String::new(),
        "CURRENT SCENE:".to_string(),
        context.current_scene.trim().to_string(),
        String::new(),
        format!("INSTRUCTIONS: {}", context.instructions.trim()),
        String::new(),
        "Generate ONLY the new scene text, nothing else.".to_string(),
    ];

    CompiledPrompt::new(system_prompts::SCENE_REWRITER, lines.join("\n"))
}

fn numbered_scenes(scenes: &[String]) -> String {
    scenes
        .iter()
        .enumerate()
        .map(|(i, scene)| format!("Scene {}:\n{}", i + 1, scene.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders the semantic validation request comparing original and edited scenes.
pub fn compile_validation(
    blueprint: &Blueprint,
    original: &[String],
    candidate: &[String],
) -> CompiledPrompt {
    let count = blueprint.scene_count();
    let lines = [
        "ORIGINAL BLUEPRINT CONSTRAINTS:".to_string(),
        format!("- Scene Count: {} (EXACT)", count),
        format!("- Characters: {}", blueprint.characters().join(", ")),
        format!("- Narration: {}", blueprint.narration()),
        format!("- Genre: {}", blueprint.genre()),
        format!("- Tone: {}", blueprint.tone_mood()),
        String::new(),
        "ORIGINAL SCENES:".to_string(),
        numbered_scenes(original),
        String::new(),
        "EDITED SCENES:".to_string(),
        numbered_scenes(candidate),
        String::new(),
        "VALIDATION CHECKLIST:".to_string(),
        format!("1. Scene count matches blueprint (exactly {})", count),
        "2. Only blueprint characters appear (no new characters)".to_string(),
        "3. POV/Narration is consistent with blueprint".to_string(),
        "4. Genre and tone alignment maintained".to_string(),
        "5. No continuous action verbs used (static imagery only)".to_string(),
        "6. Dialogue remains sparse and impactful".to_string(),
        "7. Scene boundaries are preserved".to_string(),
        String::new(),
        "Validate the edited scenes against every constraint and answer with the JSON report."
            .to_string(),
    ];

    CompiledPrompt::new(system_prompts::STORY_VALIDATOR, lines.join("\n"))
}

/// Renders the character profile request.
///
/// A non-empty `custom_prompt` replaces the rendered request entirely.
pub fn compile_character_profiles(
    story_text: &str,
    characters: &[String],
    custom_prompt: Option<&str>,
) -> CompiledPrompt {
    if let Some(custom) = custom_prompt
        && !custom.trim().is_empty()
    {
        return CompiledPrompt::new(system_prompts::CHARACTER_DESIGNER, custom.to_string());
    }

    let lines = [
        "Extract a visual profile for every listed character of this story.".to_string(),
        String::new(),
        "STORY:".to_string(),
        story_text.trim().to_string(),
        String::new(),
        "CHARACTERS:".to_string(),
        characters.join(", "),
        String::new(),
        "For EACH character give:".to_string(),
        "1. \"name\"".to_string(),
        "2. \"appearance\": {\"eyes\", \"skin\", \"hair\"}".to_string(),
        "3. \"outfit\": {\"upper\", \"lower\", \"footwear\"} as [colour] [fabric/style] [garment]"
            .to_string(),
        "4. \"props\": carried items".to_string(),
        "5. \"snippets\": {\"closeup\", \"medium\", \"wide\"}, each with \"front\", \"side\", \"back\""
            .to_string(),
        String::new(),
        "Return a JSON array of characters.".to_string(),
    ];

    CompiledPrompt::new(system_prompts::CHARACTER_DESIGNER, lines.join("\n"))
}

/// Action types and the framings they allow.
pub const NARRATIVE_LOGIC_PRIORITY: &[(&str, &[ShotType])] = &[
    (
        "dialog",
        &[ShotType::CloseUp, ShotType::Medium, ShotType::Wide],
    ),
    ("action", &[ShotType::Wide, ShotType::Medium]),
    ("reaction", &[ShotType::CloseUp, ShotType::Medium]),
    ("environment_reveal", &[ShotType::Wide]),
    ("movement", &[ShotType::Medium, ShotType::Wide]),
    ("internal_state", &[ShotType::CloseUp]),
    ("group_interaction", &[ShotType::Medium, ShotType::Wide]),
    ("intimate_moment", &[ShotType::CloseUp, ShotType::Medium]),
    ("establishing", &[ShotType::Wide]),
];

fn quoted_choices<T: std::fmt::Display>(values: impl Iterator<Item = T>) -> String {
    values
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the shot blueprint request for one scene.
///
/// # Examples
///
/// ```
/// use cineforge_narrative::compile_shot_blueprint;
///
/// let prompt = compile_shot_blueprint("Ava stands at the rail.", 0, &["Ava".to_string()]);
/// assert!(prompt.user_prompt.contains("\"Wide\", \"Medium\", \"Close-up\""));
/// assert!(prompt.user_prompt.contains("- internal_state: Close-up"));
/// ```
pub fn compile_shot_blueprint(
    scene_text: &str,
    scene_index: usize,
    characters: &[String],
) -> CompiledPrompt {
    let mut lines = vec![
        format!(
            "Analyze Scene {} and produce ONE optimal shot blueprint.",
            scene_index + 1
        ),
        String::new(),
        "SCENE TEXT:".to_string(),
        scene_text.trim().to_string(),
        String::new(),
        format!("AVAILABLE CHARACTERS: {}", characters.join(", ")),
        String::new(),
        "NARRATIVE LOGIC PRIORITY (action type: allowed shot types):".to_string(),
    ];
    lines.extend(NARRATIVE_LOGIC_PRIORITY.iter().map(|(action, shots)| {
        let allowed = shots
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("- {}: {}", action, allowed)
    }));
    lines.extend([
        String::new(),
        "Return a JSON object with these exact keys:".to_string(),
        format!("- SHOT_TYPE: one of {}", quoted_choices(ShotType::iter())),
        "- ANGLE: camera angle (e.g. \"Low angle\", \"Eye level\", \"High angle\")".to_string(),
        format!("- VIEW: one of {}", quoted_choices(CameraView::iter())),
        "- STAGING: frozen pose and placement of each character, ending with the view in brackets"
            .to_string(),
        "- RELATIONAL_STAGING: distance and relationship between characters".to_string(),
        "- SCENE_FUNCTION: what the shot does for the story".to_string(),
        String::new(),
        "Choose the shot type from the priority table for the primary action of the scene."
            .to_string(),
    ]);

    CompiledPrompt::new(system_prompts::KEYFRAME_DIRECTOR, lines.join("\n"))
}

/// Renders the background blueprint request for one scene.
pub fn compile_background_blueprint(scene_text: &str) -> CompiledPrompt {
    let lines = [
        "Analyze this scene and create a background blueprint.".to_string(),
        String::new(),
        "SCENE TEXT:".to_string(),
        scene_text.trim().to_string(),
        String::new(),
        "Return a JSON object with these exact keys:".to_string(),
        "- MASTER_LOCATION: the primary setting (e.g. \"Modern office building, glass walls\")"
            .to_string(),
        "- OVERLAY_ELEMENTS: array of secondary elements layered over the location".to_string(),
        "- LIGHTING: lighting mood and direction".to_string(),
        "- ATMOSPHERIC_DETAILS: weather, time of day, particles".to_string(),
    ];

    CompiledPrompt::new(system_prompts::PRODUCTION_DESIGNER, lines.join("\n"))
}
