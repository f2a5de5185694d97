//! Stage 3 production blueprints against a stored story.

mod test_utils;

use anyhow::Result;
use chrono::Utc;
use cineforge_core::{
    BackgroundBlueprint, CameraView, ProjectStatus, ShotBlueprint, ShotType, StoryOutput,
    StoryRecord, ValidationNotes,
};
use cineforge_narrative::{ProductionDesigner, ProjectRepository, StageSettings, system_prompts};
use cineforge_storage::InMemoryRecordStore;
use std::sync::Arc;
use test_utils::{MockAdapter, blueprint};

const PROJECT: &str = "lighthouse";

const CHARACTERS: &str = r#"Here are the profiles:
[
  {"name": "Ava", "appearance": {"eyes": "Grey", "skin": "Weathered", "hair": "Short silver"},
   "outfit": {"upper": "Navy wool peacoat", "lower": "Canvas trousers", "footwear": "Rubber boots"},
   "props": ["Brass key"]},
  {"name": "Leo", "appearance": {"eyes": "Brown"}}
]"#;

const SHOT: &str = r#"{"SHOT_TYPE": "Wide", "ANGLE": "High angle", "VIEW": "Back", "STAGING": "Ava: at the rail (Back)", "SCENE_FUNCTION": "Establish isolation"}"#;

const BACKGROUND: &str = r#"{"MASTER_LOCATION": "Lighthouse gallery at dusk", "OVERLAY_ELEMENTS": ["Iron rail", "Fog bank"], "LIGHTING": "Cold rim light", "ATMOSPHERIC_DETAILS": "Drifting sea mist"}"#;

async fn seeded(scene_count: usize) -> Result<(ProductionDesigner, ProjectRepository)> {
    let repository = ProjectRepository::new(Arc::new(InMemoryRecordStore::new()));
    repository
        .save_blueprint(PROJECT, &blueprint(scene_count as u32, 900))
        .await?;
    let scenes = (1..=scene_count)
        .map(|i| format!("Ava stands at the rail, frame {}.", i))
        .collect();
    repository
        .save_story(&StoryRecord {
            project_id: PROJECT.to_string(),
            story: StoryOutput::from_scenes("Salt", "ok", scenes),
            is_validated: true,
            validation_notes: ValidationNotes::default(),
            updated_at: Utc::now(),
        })
        .await?;
    let designer = ProductionDesigner::new(repository.clone(), StageSettings::default());
    Ok((designer, repository))
}

#[tokio::test]
async fn designs_characters_then_each_scene() -> Result<()> {
    let (designer, repository) = seeded(2).await?;
    let adapter = MockAdapter::new_texts([CHARACTERS, SHOT, BACKGROUND, "no json", "nothing"]);

    let plan = designer.design_project(PROJECT, &adapter, None).await?;

    assert_eq!(adapter.call_count(), 5);
    let prompts: Vec<_> = adapter
        .requests()
        .iter()
        .map(|r| r.system_prompt().clone().unwrap_or_default())
        .collect();
    assert_eq!(prompts[0], system_prompts::CHARACTER_DESIGNER);
    assert_eq!(prompts[1], system_prompts::KEYFRAME_DIRECTOR);
    assert_eq!(prompts[2], system_prompts::PRODUCTION_DESIGNER);

    assert_eq!(plan.characters.len(), 2);
    assert_eq!(plan.characters[0].outfit.upper, "Navy wool peacoat");
    assert_eq!(plan.characters[1].outfit.upper, "Not specified");
    assert!(plan.skipped_locked.is_empty());

    let first = &plan.scenes[0];
    assert_eq!(first.shot.shot_type, ShotType::Wide);
    assert_eq!(first.shot.view, CameraView::Back);
    assert_eq!(first.background.overlay_elements, vec!["Iron rail", "Fog bank"]);

    let second = &plan.scenes[1];
    assert_eq!(second.shot, ShotBlueprint::default());
    assert_eq!(second.background, BackgroundBlueprint::fallback());

    assert_eq!(repository.scenes(PROJECT).await?.len(), 2);
    assert_eq!(repository.characters(PROJECT).await?.len(), 2);
    let project = repository.project(PROJECT).await?.expect("project header");
    assert_eq!(project.status, ProjectStatus::Stage3Complete);
    Ok(())
}

#[tokio::test]
async fn unusable_character_answer_uses_placeholders() -> Result<()> {
    let (designer, _) = seeded(1).await?;
    let adapter = MockAdapter::new_texts(["Sorry, no profiles today.", SHOT, BACKGROUND]);

    let plan = designer.design_project(PROJECT, &adapter, None).await?;

    let names: Vec<_> = plan.characters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ava", "Leo"]);
    assert_eq!(plan.characters[0].snippets.medium.front, "Ava medium shot, front view");
    Ok(())
}

#[tokio::test]
async fn custom_character_prompt_replaces_request() -> Result<()> {
    let (designer, _) = seeded(1).await?;
    let adapter = MockAdapter::new_texts([CHARACTERS, SHOT, BACKGROUND]);

    designer
        .design_project(PROJECT, &adapter, Some("Give everyone yellow raincoats."))
        .await?;

    assert!(
        adapter.requests()[0]
            .prompt()
            .contains("Give everyone yellow raincoats.")
    );
    Ok(())
}

#[tokio::test]
async fn locked_scene_is_kept() -> Result<()> {
    let (designer, repository) = seeded(2).await?;
    let first_run = MockAdapter::new_texts([CHARACTERS, SHOT, BACKGROUND, SHOT, BACKGROUND]);
    designer.design_project(PROJECT, &first_run, None).await?;

    let locked = designer.lock_scene(PROJECT, 0).await?;
    assert!(locked.is_locked);

    let second_run = MockAdapter::new_texts([CHARACTERS, "{}", "{}"]);
    let plan = designer.design_project(PROJECT, &second_run, None).await?;

    assert_eq!(second_run.call_count(), 3);
    assert_eq!(plan.skipped_locked, vec![0]);
    let kept = repository.scene(PROJECT, 0).await?.expect("scene 0");
    assert!(kept.is_locked);
    assert_eq!(kept.shot.shot_type, ShotType::Wide);
    let redone = repository.scene(PROJECT, 1).await?.expect("scene 1");
    assert_eq!(redone.shot, ShotBlueprint::default());
    assert_eq!(redone.background, BackgroundBlueprint::default());

    let err = designer
        .regenerate_shot(PROJECT, 0, &second_run)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 409);

    let unlocked = designer.unlock_scene(PROJECT, 0).await?;
    assert!(!unlocked.is_locked);
    Ok(())
}

#[tokio::test]
async fn regenerate_shot_updates_only_the_shot() -> Result<()> {
    let (designer, repository) = seeded(1).await?;
    let first_run = MockAdapter::new_texts([CHARACTERS, SHOT, BACKGROUND]);
    designer.design_project(PROJECT, &first_run, None).await?;

    let adapter = MockAdapter::new_success(r#"{"shot_type": "close-up", "view": "profile"}"#);
    let shot = designer.regenerate_shot(PROJECT, 0, &adapter).await?;

    assert_eq!(shot.shot_type, ShotType::CloseUp);
    assert!(adapter.requests()[0].prompt().contains("Ava, Leo"));
    let stored = repository.scene(PROJECT, 0).await?.expect("scene 0");
    assert_eq!(stored.shot, shot);
    assert_eq!(stored.background.lighting, "Cold rim light");
    Ok(())
}

#[tokio::test]
async fn regenerate_shot_without_blueprint_is_not_found() -> Result<()> {
    let (designer, _) = seeded(1).await?;
    let adapter = MockAdapter::new_success(SHOT);

    let err = designer.regenerate_shot(PROJECT, 0, &adapter).await.unwrap_err();

    assert_eq!(err.http_status(), 404);
    assert_eq!(adapter.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn production_without_story_is_not_found() -> Result<()> {
    let repository = ProjectRepository::new(Arc::new(InMemoryRecordStore::new()));
    let designer = ProductionDesigner::new(repository, StageSettings::default());
    let adapter = MockAdapter::new_success(SHOT);

    let err = designer
        .design_project(PROJECT, &adapter, None)
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 404);
    assert_eq!(adapter.call_count(), 0);
    Ok(())
}
