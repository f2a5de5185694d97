//! Edit batches: all-or-nothing commits against a stored story.

mod test_utils;

use anyhow::Result;
use chrono::Utc;
use cineforge_core::{
    EditRequest, ProjectStatus, Severity, StoryOutput, StoryRecord, ValidationNotes,
};
use cineforge_error::ProviderErrorKind;
use cineforge_narrative::{
    ConstraintValidator, EditOrchestrator, ProjectRepository, StageSettings, system_prompts,
};
use cineforge_storage::InMemoryRecordStore;
use std::sync::Arc;
use cineforge_interface::EntityKind;
use test_utils::{FailingStore, MockAdapter, MockBehavior, MockResponse, blueprint};

const PROJECT: &str = "lighthouse";

const CLEAN_REPORT: &str = r#"{"isValid": true, "errors": [], "warnings": []}"#;

async fn seeded() -> Result<(EditOrchestrator, ProjectRepository, StoryRecord)> {
    let repository = ProjectRepository::new(Arc::new(InMemoryRecordStore::new()));
    repository.save_blueprint(PROJECT, &blueprint(3, 900)).await?;
    let record = StoryRecord {
        project_id: PROJECT.to_string(),
        story: StoryOutput::from_scenes(
            "Salt",
            "3 scenes, Ava and Leo only.",
            vec![
                "Ava sits at the lamp.".to_string(),
                "Leo holds the bottle.".to_string(),
                "The tide lies flat.".to_string(),
            ],
        ),
        is_validated: true,
        validation_notes: ValidationNotes::default(),
        updated_at: Utc::now(),
    };
    repository.save_story(&record).await?;

    let orchestrator = EditOrchestrator::new(
        repository.clone(),
        ConstraintValidator::with_default_rules()?,
        StageSettings::default(),
    );
    Ok((orchestrator, repository, record))
}

#[tokio::test]
async fn accepted_edit_commits_scenes_and_notes() -> Result<()> {
    let (orchestrator, repository, original) = seeded().await?;
    let adapter = MockAdapter::new_texts([
        "  Leo kneels by the open bottle, the note unrolled.  ",
        r#"{"isValid": true, "errors": [{"type": "soft", "field": "tone", "message": "Slightly warmer than scene 1", "sceneIndex": 1}], "warnings": []}"#,
    ]);

    let commit = orchestrator
        .edit_story(
            PROJECT,
            &adapter,
            &[EditRequest::regenerate(1, "Show the note itself")],
        )
        .await?;

    assert_eq!(adapter.call_count(), 2);
    let requests = adapter.requests();
    assert_eq!(
        requests[0].system_prompt().as_deref(),
        Some(system_prompts::SCENE_REWRITER)
    );
    assert!(requests[0].prompt().contains("Show the note itself"));
    assert!(requests[0].prompt().contains("Leo holds the bottle."));
    assert_eq!(
        requests[1].system_prompt().as_deref(),
        Some(system_prompts::STORY_VALIDATOR)
    );

    let stored = repository.require_story(PROJECT).await?;
    assert_eq!(stored, commit.story);
    assert_eq!(
        stored.story.scenes[1],
        "Leo kneels by the open bottle, the note unrolled."
    );
    assert_eq!(stored.story.scenes[0], original.story.scenes[0]);
    assert!(stored.story.story_text.contains("the note unrolled"));
    assert_eq!(stored.story.title, original.story.title);
    assert!(stored.is_validated);
    assert_eq!(stored.validation_notes.soft.len(), 1);
    assert_eq!(stored.validation_notes.soft[0].severity, Severity::Soft);

    let project = repository.project(PROJECT).await?.expect("project header");
    assert_eq!(project.status, ProjectStatus::Stage2Complete);
    Ok(())
}

#[tokio::test]
async fn hard_semantic_finding_leaves_store_untouched() -> Result<()> {
    let (orchestrator, repository, original) = seeded().await?;
    let adapter = MockAdapter::new_texts([
        "Mara waits at the door of the lamp room.",
        r#"{"isValid": false, "errors": [{"type": "hard", "field": "characters", "message": "Mara is not in the roster", "sceneIndex": 2}], "warnings": []}"#,
    ]);

    let err = orchestrator
        .edit_story(
            PROJECT,
            &adapter,
            &[EditRequest::regenerate(2, "Add a visitor")],
        )
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 422);
    let violation = err.constraint_violation().expect("constraint violation");
    assert!(violation.has_field("characters"));
    assert_eq!(repository.require_story(PROJECT).await?, original);
    assert!(repository.project(PROJECT).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn out_of_range_index_makes_no_calls() -> Result<()> {
    let (orchestrator, repository, original) = seeded().await?;
    let adapter = MockAdapter::new_success(CLEAN_REPORT);

    let err = orchestrator
        .edit_story(
            PROJECT,
            &adapter,
            &[
                EditRequest::regenerate(0, "Warmer light"),
                EditRequest::regenerate(3, "Does not exist"),
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 400);
    assert_eq!(adapter.call_count(), 0);
    assert_eq!(repository.require_story(PROJECT).await?, original);
    Ok(())
}

#[tokio::test]
async fn provider_failure_writes_nothing() -> Result<()> {
    let (orchestrator, repository, original) = seeded().await?;
    let adapter = MockAdapter::new_with_behavior(MockBehavior::Sequence(vec![
        MockResponse::Success("Ava turns the lamp down.".to_string()),
        MockResponse::Error(ProviderErrorKind::Http {
            status: 503,
            message: "overloaded".to_string(),
        }),
    ]));

    let err = orchestrator
        .edit_story(
            PROJECT,
            &adapter,
            &[
                EditRequest::regenerate(0, "Dimmer"),
                EditRequest::regenerate(2, "Calmer"),
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 502);
    assert_eq!(repository.require_story(PROJECT).await?, original);
    Ok(())
}

#[tokio::test]
async fn modify_edit_applies_replacement_without_rewrite() -> Result<()> {
    let (orchestrator, repository, _) = seeded().await?;
    let adapter = MockAdapter::new_success(CLEAN_REPORT);

    orchestrator
        .edit_story(
            PROJECT,
            &adapter,
            &[EditRequest::modify(2, "The tide holds its breath.")],
        )
        .await?;

    assert_eq!(adapter.call_count(), 1);
    let stored = repository.require_story(PROJECT).await?;
    assert_eq!(stored.story.scenes[2], "The tide holds its breath.");
    Ok(())
}

#[tokio::test]
async fn missing_story_is_not_found() -> Result<()> {
    let (orchestrator, _, _) = seeded().await?;
    let adapter = MockAdapter::new_success(CLEAN_REPORT);

    let err = orchestrator
        .edit_story("elsewhere", &adapter, &[EditRequest::regenerate(0, "x")])
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 404);
    assert_eq!(adapter.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn status_write_failure_still_commits_the_edit() -> Result<()> {
    let repository = ProjectRepository::new(Arc::new(FailingStore::new(EntityKind::Project)));
    repository.save_blueprint(PROJECT, &blueprint(3, 900)).await?;
    repository
        .save_story(&StoryRecord {
            project_id: PROJECT.to_string(),
            story: StoryOutput::from_scenes(
                "Salt",
                "3 scenes, Ava and Leo only.",
                vec![
                    "Ava sits at the lamp.".to_string(),
                    "Leo holds the bottle.".to_string(),
                    "The tide lies flat.".to_string(),
                ],
            ),
            is_validated: true,
            validation_notes: ValidationNotes::default(),
            updated_at: Utc::now(),
        })
        .await?;
    let orchestrator = EditOrchestrator::new(
        repository.clone(),
        ConstraintValidator::with_default_rules()?,
        StageSettings::default(),
    );
    let adapter = MockAdapter::new_success(CLEAN_REPORT);

    let commit = orchestrator
        .edit_story(
            PROJECT,
            &adapter,
            &[EditRequest::modify(2, "The tide turns.")],
        )
        .await?;

    assert_eq!(commit.story.story.scenes[2], "The tide turns.");
    assert_eq!(repository.require_story(PROJECT).await?, commit.story);
    assert!(repository.project(PROJECT).await?.is_none());
    Ok(())
}
