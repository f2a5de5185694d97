//! Typed view over the record store.

use chrono::Utc;
use cineforge_core::{
    Blueprint, CharacterRecord, ProjectRecord, ProjectStatus, SceneRecord, ShotBlueprint,
    StoryOutput, StoryRecord, ValidationNotes,
};
use cineforge_error::{
    CineforgeResult, InputError, InputErrorKind, JsonError, NarrativeError, NarrativeErrorKind,
};
use cineforge_interface::{EntityKind, RecordKey, RecordStore};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

/// Project-scoped records, read and written through a [`RecordStore`].
#[derive(Clone)]
pub struct ProjectRepository {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for ProjectRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRepository").finish_non_exhaustive()
    }
}

fn to_json<T: Serialize>(value: &T) -> CineforgeResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize record: {}", e)).into())
}

fn from_json<T: DeserializeOwned>(value: JsonValue) -> CineforgeResult<T> {
    serde_json::from_value(value)
        .map_err(|e| JsonError::new(format!("Failed to deserialize record: {}", e)).into())
}

/// Rejects an empty project id before anything else happens.
///
/// # Errors
///
/// Returns [`InputErrorKind::MissingField`] for `projectId`.
#[track_caller]
pub fn require_project_id(project_id: &str) -> Result<(), InputError> {
    if project_id.trim().is_empty() {
        return Err(InputError::new(InputErrorKind::MissingField(
            "projectId".to_string(),
        )));
    }
    Ok(())
}

impl ProjectRepository {
    /// Repository over `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    async fn find<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        key: &RecordKey,
    ) -> CineforgeResult<Option<T>> {
        match self.store.find_unique(kind, key).await? {
            Some(value) => Ok(Some(from_json(value)?)),
            None => Ok(None),
        }
    }

    async fn find_all<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        project_id: &str,
    ) -> CineforgeResult<Vec<T>> {
        self.store
            .find_many(kind, &RecordKey::project_prefix(project_id))
            .await?
            .into_iter()
            .map(|(_, value)| from_json(value))
            .collect()
    }

    /// Project header, if the project has one.
    pub async fn project(&self, project_id: &str) -> CineforgeResult<Option<ProjectRecord>> {
        self.find(EntityKind::Project, &RecordKey::project(project_id))
            .await
    }

    /// Records the furthest completed stage.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> CineforgeResult<ProjectRecord> {
        let record = ProjectRecord {
            id: project_id.to_string(),
            status,
            updated_at: Utc::now(),
        };
        self.store
            .upsert(
                EntityKind::Project,
                &RecordKey::project(project_id),
                to_json(&record)?,
            )
            .await?;
        tracing::info!(%status, "Project status updated");
        Ok(record)
    }

    /// Moves the project header to `status` after a committed write.
    ///
    /// The header is bookkeeping for data already stored, so a failed write
    /// is logged and not returned.
    pub async fn advance_status(&self, project_id: &str, status: ProjectStatus) {
        if let Err(e) = self.set_status(project_id, status).await {
            tracing::warn!(error = %e, %status, "Project status not updated");
        }
    }

    /// Stored blueprint, if any.
    pub async fn blueprint(&self, project_id: &str) -> CineforgeResult<Option<Blueprint>> {
        self.find(EntityKind::Blueprint, &RecordKey::project(project_id))
            .await
    }

    /// Stored blueprint.
    ///
    /// # Errors
    ///
    /// Returns [`NarrativeErrorKind::MissingBlueprint`] when none is stored.
    pub async fn require_blueprint(&self, project_id: &str) -> CineforgeResult<Blueprint> {
        self.blueprint(project_id).await?.ok_or_else(|| {
            NarrativeError::new(NarrativeErrorKind::MissingBlueprint(project_id.to_string()))
                .into()
        })
    }

    /// Creates or replaces the project's blueprint.
    pub async fn save_blueprint(
        &self,
        project_id: &str,
        blueprint: &Blueprint,
    ) -> CineforgeResult<()> {
        self.store
            .upsert(
                EntityKind::Blueprint,
                &RecordKey::project(project_id),
                to_json(blueprint)?,
            )
            .await?;
        Ok(())
    }

    /// Stored story, if any.
    pub async fn story(&self, project_id: &str) -> CineforgeResult<Option<StoryRecord>> {
        self.find(EntityKind::Story, &RecordKey::project(project_id))
            .await
    }

    /// Stored story.
    ///
    /// # Errors
    ///
    /// Returns [`NarrativeErrorKind::MissingStory`] when none is stored.
    pub async fn require_story(&self, project_id: &str) -> CineforgeResult<StoryRecord> {
        self.story(project_id).await?.ok_or_else(|| {
            NarrativeError::new(NarrativeErrorKind::MissingStory(project_id.to_string())).into()
        })
    }

    /// Creates or replaces the project's story.
    pub async fn save_story(&self, record: &StoryRecord) -> CineforgeResult<()> {
        self.store
            .upsert(
                EntityKind::Story,
                &RecordKey::project(&record.project_id),
                to_json(record)?,
            )
            .await?;
        Ok(())
    }

    /// Writes an accepted edit in a single store update: scenes, derived
    /// text and count, the validated flag and the soft findings together.
    #[tracing::instrument(skip(self, story, notes), fields(scene_count = story.scenes.len()))]
    pub async fn commit_story_edit(
        &self,
        project_id: &str,
        story: &StoryOutput,
        notes: &ValidationNotes,
    ) -> CineforgeResult<StoryRecord> {
        let patch = json!({
            "scenes": story.scenes,
            "storyText": story.story_text,
            "wordCountActual": story.word_count_actual,
            "isValidated": true,
            "validationNotes": to_json(notes)?,
            "updatedAt": to_json(&Utc::now())?,
        });
        let stored = self
            .store
            .update(EntityKind::Story, &RecordKey::project(project_id), patch)
            .await?;
        from_json(stored)
    }

    /// Stored production blueprint for one scene, if any.
    pub async fn scene(
        &self,
        project_id: &str,
        scene_index: usize,
    ) -> CineforgeResult<Option<SceneRecord>> {
        self.find(
            EntityKind::Scene,
            &RecordKey::scene(project_id, scene_index),
        )
        .await
    }

    /// Every stored scene blueprint of the project, by index.
    pub async fn scenes(&self, project_id: &str) -> CineforgeResult<Vec<SceneRecord>> {
        self.find_all(EntityKind::Scene, project_id).await
    }

    /// Creates or replaces a scene blueprint.
    pub async fn save_scene(&self, record: &SceneRecord) -> CineforgeResult<()> {
        self.store
            .upsert(
                EntityKind::Scene,
                &RecordKey::scene(&record.project_id, record.scene_index),
                to_json(record)?,
            )
            .await?;
        Ok(())
    }

    /// Replaces only the shot of a stored scene.
    pub async fn update_scene_shot(
        &self,
        project_id: &str,
        scene_index: usize,
        shot: &ShotBlueprint,
    ) -> CineforgeResult<SceneRecord> {
        let patch = json!({
            "shot": to_json(shot)?,
            "updatedAt": to_json(&Utc::now())?,
        });
        let stored = self
            .store
            .update(
                EntityKind::Scene,
                &RecordKey::scene(project_id, scene_index),
                patch,
            )
            .await?;
        from_json(stored)
    }

    /// Sets or clears a scene's lock.
    ///
    /// # Errors
    ///
    /// Returns a not-found storage error when the scene has no blueprint yet.
    #[tracing::instrument(skip(self))]
    pub async fn set_scene_lock(
        &self,
        project_id: &str,
        scene_index: usize,
        locked: bool,
    ) -> CineforgeResult<SceneRecord> {
        let patch = json!({
            "isLocked": locked,
            "updatedAt": to_json(&Utc::now())?,
        });
        let stored = self
            .store
            .update(
                EntityKind::Scene,
                &RecordKey::scene(project_id, scene_index),
                patch,
            )
            .await?;
        from_json(stored)
    }

    /// Every stored character profile of the project, by name.
    pub async fn characters(&self, project_id: &str) -> CineforgeResult<Vec<CharacterRecord>> {
        self.find_all(EntityKind::Character, project_id).await
    }

    /// Creates or replaces a character profile.
    pub async fn save_character(&self, record: &CharacterRecord) -> CineforgeResult<()> {
        self.store
            .upsert(
                EntityKind::Character,
                &RecordKey::character(&record.project_id, &record.profile.name),
                to_json(record)?,
            )
            .await?;
        Ok(())
    }
}
