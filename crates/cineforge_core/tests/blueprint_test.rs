use cineforge_core::{Blueprint, Narration, WordCountWindow};
use cineforge_error::InputErrorKind;

fn valid_builder() -> cineforge_core::BlueprintBuilder {
    let mut builder = Blueprint::builder();
    builder
        .core_idea("Two strangers share a lighthouse during a storm")
        .genre("Drama")
        .tone_mood("Quiet, tense")
        .word_count(900u32)
        .narration(Narration::ThirdPerson)
        .scene_count(3u32)
        .characters(vec!["Ava".to_string(), "Leo".to_string()]);
    builder
}

#[test]
fn builder_applies_defaults() -> anyhow::Result<()> {
    let blueprint = valid_builder().build()?;
    assert_eq!(blueprint.language_style(), "English, cinematic");
    assert_eq!(blueprint.selected_model(), "anthropic/claude-3.5-sonnet");
    assert!(blueprint.custom_prompt().is_none());
    blueprint.validate()?;
    Ok(())
}

#[test]
fn builder_reports_missing_field() {
    let err = Blueprint::builder()
        .genre("Drama")
        .build()
        .expect_err("core_idea was never set");
    assert!(matches!(err.kind, InputErrorKind::MissingField(_)));
}

#[test]
fn validate_reports_every_violation() -> anyhow::Result<()> {
    let blueprint = valid_builder()
        .core_idea("short")
        .word_count(100u32)
        .scene_count(21u32)
        .characters(Vec::<String>::new())
        .build()?;

    let err = blueprint.validate().expect_err("four fields are invalid");
    let fields: Vec<String> = err.violations().into_iter().map(|v| v.field).collect();
    assert_eq!(fields, vec!["coreIdea", "wordCount", "sceneCount", "characters"]);
    Ok(())
}

#[test]
fn validate_rejects_duplicate_names_ignoring_case() -> anyhow::Result<()> {
    let blueprint = valid_builder()
        .characters(vec!["Ava".to_string(), "ava".to_string()])
        .build()?;
    let err = blueprint.validate().expect_err("duplicate roster entry");
    assert!(format!("{}", err).contains("duplicate name"));
    Ok(())
}

#[test]
fn validate_accepts_bounds() -> anyhow::Result<()> {
    valid_builder().word_count(500u32).scene_count(1u32).build()?.validate()?;
    valid_builder().word_count(10_000u32).scene_count(20u32).build()?.validate()?;
    Ok(())
}

#[test]
fn tolerance_window_for_one_thousand_words() {
    let window = WordCountWindow::around(1000);
    assert!(!window.contains(969));
    assert!(window.contains(970));
    assert!(window.contains(1030));
    assert!(!window.contains(1031));
}

#[test]
fn blueprint_deserializes_camel_case_with_defaults() -> anyhow::Result<()> {
    let blueprint: Blueprint = serde_json::from_value(serde_json::json!({
        "coreIdea": "A courier crosses a frozen city at dawn",
        "genre": "Thriller",
        "toneMood": "Cold",
        "wordCount": 1200,
        "narration": "first-person",
        "sceneCount": 4,
        "characters": ["Mara"]
    }))?;
    assert_eq!(*blueprint.narration(), Narration::FirstPerson);
    assert_eq!(blueprint.language_style(), "English, cinematic");
    assert!(blueprint.has_character("mara"));
    Ok(())
}
