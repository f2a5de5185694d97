//! Studio wiring: adapter resolution, storage backends and the three stages.

mod test_utils;

use anyhow::Result;
use cineforge::{
    CineforgeConfig, EditRequest, InMemoryRecordStore, OPENROUTER_KEY_VAR, ProjectStatus,
    ProviderErrorKind, ShotType, StorageConfig, Studio,
};
use std::sync::Arc;
use test_utils::{MockAdapter, TEST_KEY, blueprint, install, story_response};

const PROJECT: &str = "lighthouse";

const CLEAN_REPORT: &str = r#"{"isValid": true, "errors": [], "warnings": []}"#;

const CHARACTERS: &str = r#"[{"name": "Ava", "outfit": {"upper": "Navy wool peacoat"}}, {"name": "Leo"}]"#;

const SHOT: &str = r#"{"SHOT_TYPE": "Wide", "ANGLE": "High angle", "VIEW": "Back"}"#;

const BACKGROUND: &str = r#"{"MASTER_LOCATION": "Lighthouse gallery at dusk", "LIGHTING": "Cold rim light"}"#;

fn studio() -> Result<Studio> {
    Ok(Studio::new(
        CineforgeConfig::default(),
        Arc::new(InMemoryRecordStore::new()),
    )?)
}

async fn with_story(studio: &Studio) -> Result<()> {
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));
    install(studio, &adapter);
    studio
        .generate_story(PROJECT, &blueprint(3, 900), Some(TEST_KEY))
        .await?;
    Ok(())
}

#[tokio::test]
async fn three_stages_end_to_end() -> Result<()> {
    let studio = studio()?;
    let adapter = MockAdapter::new_texts([
        story_response("Salt", &[300, 300, 300]),
        CLEAN_REPORT.to_string(),
        CHARACTERS.to_string(),
        SHOT.to_string(),
        BACKGROUND.to_string(),
        SHOT.to_string(),
        BACKGROUND.to_string(),
        SHOT.to_string(),
        BACKGROUND.to_string(),
    ]);
    install(&studio, &adapter);

    let story = studio
        .generate_story(PROJECT, &blueprint(3, 900), Some(TEST_KEY))
        .await?;
    assert_eq!(story.story.title, "Salt");
    assert_eq!(adapter.call_count(), 1);

    let commit = studio
        .edit_story(
            PROJECT,
            &[EditRequest::modify(1, "Leo reads the note aloud to the empty gallery.")],
            Some(TEST_KEY),
        )
        .await?;
    assert_eq!(adapter.call_count(), 2);
    assert_eq!(
        commit.story.story.scenes[1],
        "Leo reads the note aloud to the empty gallery."
    );
    assert_eq!(studio.story(PROJECT).await?, commit.story);

    let plan = studio
        .design_production(PROJECT, None, Some(TEST_KEY))
        .await?;
    assert_eq!(adapter.call_count(), 9);
    assert_eq!(plan.characters.len(), 2);
    assert_eq!(plan.scenes.len(), 3);
    assert!(plan.scenes.iter().all(|s| s.shot.shot_type == ShotType::Wide));

    let scenes = studio.scenes(PROJECT).await?;
    assert_eq!(scenes.len(), 3);
    assert_eq!(
        scenes[1].scene_text,
        "Leo reads the note aloud to the empty gallery."
    );
    let project = studio
        .repository()
        .project(PROJECT)
        .await?
        .expect("project header");
    assert_eq!(project.status, ProjectStatus::Stage3Complete);
    Ok(())
}

#[tokio::test]
async fn missing_credential_fails_before_any_call() -> Result<()> {
    if std::env::var(OPENROUTER_KEY_VAR).is_ok() {
        return Ok(());
    }
    let studio = studio()?;
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));
    install(&studio, &adapter);

    let err = studio
        .generate_story(PROJECT, &blueprint(3, 900), Some("   "))
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 400);
    assert_eq!(adapter.call_count(), 0);
    assert!(studio.repository().story(PROJECT).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn empty_project_id_is_rejected() -> Result<()> {
    let studio = studio()?;

    let err = studio
        .generate_story(" ", &blueprint(3, 900), Some(TEST_KEY))
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);

    let err = studio.scenes("").await.unwrap_err();
    assert_eq!(err.http_status(), 400);
    Ok(())
}

#[tokio::test]
async fn unknown_project_is_not_found() -> Result<()> {
    let studio = studio()?;

    let err = studio.story("nowhere").await.unwrap_err();
    assert_eq!(err.http_status(), 404);

    let err = studio
        .validate_story("nowhere", &["A scene.".to_string()], Some(TEST_KEY))
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
    Ok(())
}

#[tokio::test]
async fn validate_story_never_writes() -> Result<()> {
    let studio = studio()?;
    with_story(&studio).await?;
    let before = studio.story(PROJECT).await?;

    let adapter = MockAdapter::new_success(CLEAN_REPORT);
    install(&studio, &adapter);
    let report = studio
        .validate_story(
            PROJECT,
            &["Only one scene now.".to_string()],
            Some(TEST_KEY),
        )
        .await?;

    assert!(!report.is_valid());
    assert_eq!(report.errors()[0].field, "sceneCount");
    assert_eq!(adapter.call_count(), 0);
    assert_eq!(studio.story(PROJECT).await?, before);
    Ok(())
}

#[tokio::test]
async fn regenerate_scene_returns_a_preview() -> Result<()> {
    let studio = studio()?;
    with_story(&studio).await?;
    let before = studio.story(PROJECT).await?;

    let adapter = MockAdapter::new_success("  Ava lights the lamp one last time.\n");
    install(&studio, &adapter);

    let err = studio
        .regenerate_scene(PROJECT, 3, "Make it brighter", Some(TEST_KEY))
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);
    assert_eq!(adapter.call_count(), 0);

    let preview = studio
        .regenerate_scene(PROJECT, 0, "Make it brighter", Some(TEST_KEY))
        .await?;
    assert_eq!(preview, "Ava lights the lamp one last time.");
    assert_eq!(adapter.call_count(), 1);
    assert_eq!(studio.story(PROJECT).await?, before);
    Ok(())
}

#[tokio::test]
async fn provider_failure_maps_to_bad_gateway() -> Result<()> {
    let studio = studio()?;
    let adapter = MockAdapter::new_error(ProviderErrorKind::Http {
        status: 429,
        message: "Rate limited".to_string(),
    });
    install(&studio, &adapter);

    let err = studio
        .generate_story(PROJECT, &blueprint(3, 900), Some(TEST_KEY))
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 502);
    assert!(studio.repository().story(PROJECT).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn locked_scene_survives_through_the_studio() -> Result<()> {
    let studio = studio()?;
    let adapter = MockAdapter::new_texts([
        story_response("Salt", &[450, 450]),
        CHARACTERS.to_string(),
        SHOT.to_string(),
        BACKGROUND.to_string(),
        SHOT.to_string(),
        BACKGROUND.to_string(),
    ]);
    install(&studio, &adapter);
    studio
        .generate_story(PROJECT, &blueprint(2, 900), Some(TEST_KEY))
        .await?;
    studio.design_production(PROJECT, None, Some(TEST_KEY)).await?;

    let locked = studio.lock_scene(PROJECT, 1).await?;
    assert!(locked.is_locked);

    let err = studio
        .regenerate_shot(PROJECT, 1, Some(TEST_KEY))
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 409);
    assert_eq!(adapter.call_count(), 6);

    studio.unlock_scene(PROJECT, 1).await?;
    assert!(!studio.scenes(PROJECT).await?[1].is_locked);
    Ok(())
}

#[tokio::test]
async fn filesystem_storage_outlives_the_studio() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = CineforgeConfig::default().with_storage(StorageConfig::filesystem(dir.path()));

    let first = Studio::from_config(config.clone())?;
    with_story(&first).await?;
    let written = first.story(PROJECT).await?;
    drop(first);

    let second = Studio::from_config(config)?;
    assert_eq!(second.story(PROJECT).await?, written);
    assert_eq!(
        second.repository().require_blueprint(PROJECT).await?,
        blueprint(3, 900)
    );
    Ok(())
}

#[tokio::test]
async fn adapter_cache_can_be_cleared() -> Result<()> {
    let studio = studio()?;
    let adapter = MockAdapter::new_success(CLEAN_REPORT);
    install(&studio, &adapter);
    assert_eq!(studio.factory().cached_count(), 1);

    studio.clear_adapter_cache();

    assert_eq!(studio.factory().cached_count(), 0);
    Ok(())
}
