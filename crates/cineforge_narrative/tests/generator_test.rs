//! Stage 1 end to end: blueprint in, stored story out.

mod test_utils;

use anyhow::Result;
use cineforge_core::ProjectStatus;
use cineforge_error::{CineforgeErrorKind, ProviderErrorKind};
use cineforge_narrative::{
    ConstraintValidator, ProjectRepository, StageSettings, StoryGenerator, system_prompts,
};
use cineforge_storage::InMemoryRecordStore;
use std::sync::Arc;
use std::time::Duration;
use cineforge_interface::EntityKind;
use test_utils::{FailingStore, MockAdapter, blueprint, story_response};

fn generator(settings: StageSettings) -> Result<(StoryGenerator, ProjectRepository)> {
    let repository = ProjectRepository::new(Arc::new(InMemoryRecordStore::new()));
    let generator = StoryGenerator::new(
        repository.clone(),
        ConstraintValidator::with_default_rules()?,
        settings,
    );
    Ok((generator, repository))
}

#[tokio::test]
async fn conforming_story_is_stored() -> Result<()> {
    let (generator, repository) = generator(StageSettings::default())?;
    let bp = blueprint(3, 900);
    let adapter = MockAdapter::new_success(story_response("The Last Lamp", &[300, 300, 300]));

    let record = generator.generate_for_project("lighthouse", &adapter, &bp).await?;

    assert_eq!(adapter.call_count(), 1);
    assert_eq!(record.story.title, "The Last Lamp");
    assert_eq!(record.story.scenes.len(), 3);
    assert_eq!(record.story.word_count_actual, 900);
    assert!(record.is_validated);
    assert!(record.validation_notes.warnings.is_empty());

    let stored = repository.require_story("lighthouse").await?;
    assert_eq!(stored.story, record.story);
    assert_eq!(repository.require_blueprint("lighthouse").await?, bp);
    let project = repository.project("lighthouse").await?.expect("project header");
    assert_eq!(project.status, ProjectStatus::Stage1Complete);
    Ok(())
}

#[tokio::test]
async fn prompt_uses_story_stage_settings() -> Result<()> {
    let (generator, _) = generator(StageSettings::default())?;
    let bp = blueprint(3, 900);
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));

    generator.generate(&adapter, &bp).await?;

    let request = &adapter.requests()[0];
    assert_eq!(
        request.system_prompt().as_deref(),
        Some(system_prompts::STORY_ARCHITECT)
    );
    assert_eq!(*request.max_tokens(), 6000);
    assert!(request.prompt().contains("Required Scene Count: 3 (EXACT)"));
    assert!(request.prompt().contains("873-927 words"));
    Ok(())
}

#[tokio::test]
async fn scene_count_mismatch_is_rejected_and_not_stored() -> Result<()> {
    let (generator, repository) = generator(StageSettings::default())?;
    let bp = blueprint(3, 900);
    let adapter = MockAdapter::new_success(story_response("Salt", &[450, 450]));

    let err = generator
        .generate_for_project("lighthouse", &adapter, &bp)
        .await
        .unwrap_err();

    let violation = err.constraint_violation().expect("constraint violation");
    assert_eq!(
        violation.messages(),
        vec!["Scene count mismatch: expected 3, got 2"]
    );
    assert_eq!(err.http_status(), 422);
    assert!(repository.story("lighthouse").await?.is_none());
    assert!(repository.project("lighthouse").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn invalid_blueprint_makes_no_call() -> Result<()> {
    let (generator, _) = generator(StageSettings::default())?;
    let bp = blueprint(3, 100);
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));

    let err = generator.generate(&adapter, &bp).await.unwrap_err();

    assert_eq!(err.http_status(), 400);
    assert_eq!(adapter.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn empty_project_id_is_rejected() -> Result<()> {
    let (generator, _) = generator(StageSettings::default())?;
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));

    let err = generator
        .generate_for_project("  ", &adapter, &blueprint(3, 900))
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 400);
    assert_eq!(adapter.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn slow_provider_times_out() -> Result<()> {
    let (generator, repository) =
        generator(StageSettings::default().with_call_timeout_secs(1u64))?;
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]))
        .with_delay(Duration::from_secs(3));

    let err = generator
        .generate_for_project("lighthouse", &adapter, &blueprint(3, 900))
        .await
        .unwrap_err();

    match err.kind() {
        CineforgeErrorKind::Provider(provider) => {
            assert_eq!(provider.kind, ProviderErrorKind::Timeout { seconds: 1 });
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(err.http_status(), 504);
    assert!(repository.story("lighthouse").await?.is_none());
    Ok(())
}

fn generator_over(fail_on: EntityKind) -> Result<(StoryGenerator, ProjectRepository)> {
    let repository = ProjectRepository::new(Arc::new(FailingStore::new(fail_on)));
    let generator = StoryGenerator::new(
        repository.clone(),
        ConstraintValidator::with_default_rules()?,
        StageSettings::default(),
    );
    Ok((generator, repository))
}

#[tokio::test]
async fn status_write_failure_keeps_the_stored_story() -> Result<()> {
    let (generator, repository) = generator_over(EntityKind::Project)?;
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));

    let record = generator
        .generate_for_project("lighthouse", &adapter, &blueprint(3, 900))
        .await?;

    assert_eq!(repository.require_story("lighthouse").await?, record);
    assert!(repository.blueprint("lighthouse").await?.is_some());
    assert!(repository.project("lighthouse").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn story_write_failure_stores_no_blueprint() -> Result<()> {
    let (generator, repository) = generator_over(EntityKind::Story)?;
    let adapter = MockAdapter::new_success(story_response("Salt", &[300, 300, 300]));

    let err = generator
        .generate_for_project("lighthouse", &adapter, &blueprint(3, 900))
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 500);
    assert!(repository.blueprint("lighthouse").await?.is_none());
    assert!(repository.project("lighthouse").await?.is_none());
    Ok(())
}
