//! Edit/regenerate orchestration.
//!
//! An edit batch runs against a clone of the stored scene list. The clone is
//! fully applied before validation, and nothing is written unless the merged
//! report has no hard error.

use crate::{
    ConstraintValidator, ProjectRepository, SceneEditContext, StageSettings,
    call::generate_text, compile_scene_regeneration, repository::require_project_id,
    validator::constraint_violation,
};
use cineforge_core::{
    Blueprint, EditRequest, EditType, ProjectStatus, StoryRecord, ValidationNotes,
    ValidationOutput,
};
use cineforge_error::{
    CineforgeResult, ConstraintViolation, InputError, InputErrorKind, NarrativeError,
    NarrativeErrorKind,
};
use cineforge_interface::GenerationAdapter;
use futures::future::try_join_all;

/// Where an edit session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EditState {
    /// Holding the stored scenes, nothing applied
    Stored,
    /// Replacements applied to the clone
    EditsApplied,
    /// Report attached
    Validated,
    /// Accepted for persistence
    Committed,
    /// Discarded because of hard errors
    Rejected,
}

/// Terminal outcome of an edit session.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// Edited scenes and the report to store alongside them
    Committed {
        /// Full replacement scene list
        scenes: Vec<String>,
        /// Merged validation report
        report: ValidationOutput,
    },
    /// Hard findings that blocked the edit
    Rejected(ConstraintViolation),
}

/// State machine for one edit batch over a project's scenes.
///
/// # Examples
///
/// ```
/// use cineforge_core::ValidationOutput;
/// use cineforge_narrative::{EditOutcome, EditSession, EditState};
///
/// let mut session = EditSession::new(vec!["one".to_string(), "two".to_string()]);
/// session.apply_edits(vec![(1, "TWO".to_string())]).unwrap();
/// session.record_validation(ValidationOutput::valid()).unwrap();
///
/// match session.finish().unwrap() {
///     EditOutcome::Committed { scenes, .. } => assert_eq!(scenes, vec!["one", "TWO"]),
///     EditOutcome::Rejected(_) => unreachable!(),
/// }
/// assert_eq!(session.state(), EditState::Committed);
/// assert_eq!(session.original(), &["one".to_string(), "two".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct EditSession {
    state: EditState,
    original: Vec<String>,
    scenes: Vec<String>,
    report: Option<ValidationOutput>,
}

impl EditSession {
    /// Session over the stored scenes. The working list starts as a clone.
    pub fn new(original: Vec<String>) -> Self {
        Self {
            state: EditState::Stored,
            scenes: original.clone(),
            original,
            report: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> EditState {
        self.state
    }

    /// Scenes as stored before the batch.
    pub fn original(&self) -> &[String] {
        &self.original
    }

    /// Working scene list.
    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Report attached by [`EditSession::record_validation`].
    pub fn report(&self) -> Option<&ValidationOutput> {
        self.report.as_ref()
    }

    #[track_caller]
    fn expect_state(&self, expected: EditState, action: &str) -> Result<(), NarrativeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(NarrativeError::new(NarrativeErrorKind::InvalidTransition {
                from: self.state.to_string(),
                action: action.to_string(),
            }))
        }
    }

    /// Applies every replacement to the working list, in order.
    ///
    /// # Errors
    ///
    /// Fails outside [`EditState::Stored`], or with
    /// [`InputErrorKind::SceneIndexOutOfRange`] before touching anything.
    pub fn apply_edits(&mut self, replacements: Vec<(usize, String)>) -> CineforgeResult<()> {
        self.expect_state(EditState::Stored, "apply_edits")?;
        check_indexes(replacements.iter().map(|(i, _)| *i), self.scenes.len())?;
        for (index, text) in replacements {
            self.scenes[index] = text;
        }
        self.state = EditState::EditsApplied;
        Ok(())
    }

    /// Attaches the validation report for the fully applied list.
    ///
    /// # Errors
    ///
    /// Fails outside [`EditState::EditsApplied`].
    pub fn record_validation(&mut self, report: ValidationOutput) -> CineforgeResult<()> {
        self.expect_state(EditState::EditsApplied, "record_validation")?;
        self.report = Some(report);
        self.state = EditState::Validated;
        Ok(())
    }

    /// Commits or rejects according to the attached report.
    ///
    /// The working list moves into the outcome on commit and is dropped on
    /// rejection.
    ///
    /// # Errors
    ///
    /// Fails outside [`EditState::Validated`].
    pub fn finish(&mut self) -> CineforgeResult<EditOutcome> {
        self.expect_state(EditState::Validated, "finish")?;
        let report = self.report.take().unwrap_or_default();
        let scenes = std::mem::take(&mut self.scenes);
        match constraint_violation(&report) {
            Some(violation) => {
                self.state = EditState::Rejected;
                self.report = Some(report);
                Ok(EditOutcome::Rejected(violation))
            }
            None => {
                self.state = EditState::Committed;
                self.report = Some(report.clone());
                Ok(EditOutcome::Committed { scenes, report })
            }
        }
    }
}

#[track_caller]
fn check_indexes(
    indexes: impl IntoIterator<Item = usize>,
    scene_count: usize,
) -> Result<(), InputError> {
    match indexes.into_iter().find(|&i| i >= scene_count) {
        Some(index) => Err(InputError::new(InputErrorKind::SceneIndexOutOfRange {
            index,
            scene_count,
        })),
        None => Ok(()),
    }
}

/// Rewrites one scene and returns the raw generated text, trimmed.
///
/// # Errors
///
/// Propagates provider errors, including the per-call timeout.
#[tracing::instrument(skip(adapter, blueprint, current_scene, instructions, settings))]
pub async fn regenerate_scene(
    adapter: &dyn GenerationAdapter,
    blueprint: &Blueprint,
    scene_index: usize,
    current_scene: &str,
    instructions: &str,
    settings: &StageSettings,
) -> CineforgeResult<String> {
    let prompt = compile_scene_regeneration(&SceneEditContext {
        blueprint,
        scene_index,
        current_scene,
        instructions,
    });
    let text = generate_text(
        adapter,
        &prompt.to_params(settings.regeneration()),
        *settings.call_timeout_secs(),
    )
    .await?;
    Ok(text.trim().to_string())
}

/// Accepted edit: the stored record and the report behind it.
#[derive(Debug, Clone)]
pub struct EditCommit {
    /// Story as written
    pub story: StoryRecord,
    /// Merged validation report
    pub report: ValidationOutput,
}

/// Runs edit batches against stored stories.
#[derive(Debug, Clone)]
pub struct EditOrchestrator {
    repository: ProjectRepository,
    validator: ConstraintValidator,
    settings: StageSettings,
}

impl EditOrchestrator {
    /// Orchestrator over the given collaborators.
    pub fn new(
        repository: ProjectRepository,
        validator: ConstraintValidator,
        settings: StageSettings,
    ) -> Self {
        Self {
            repository,
            validator,
            settings,
        }
    }

    /// Applies an edit batch to the stored story.
    ///
    /// Every scene index is checked before any generation call. Regenerations
    /// run concurrently and land on the clone only once all of them have
    /// succeeded. `modify` edits apply their `replacement_text`, when given,
    /// without a call. The fully applied clone is then validated (structural,
    /// then semantic). Hard errors reject the batch with nothing written;
    /// otherwise the scenes, derived text, validated flag and soft findings
    /// are written in one update and the project moves to `stage2_complete`
    /// (a failed status write is logged, the edit stays committed).
    ///
    /// # Errors
    ///
    /// Input errors for a bad project id or scene index, narrative errors
    /// when the blueprint or story is missing, provider errors from any call,
    /// and a [`ConstraintViolation`] on rejection.
    #[tracing::instrument(
        skip(self, adapter, edits),
        fields(edit_count = edits.len(), provider = adapter.provider_name())
    )]
    pub async fn edit_story(
        &self,
        project_id: &str,
        adapter: &dyn GenerationAdapter,
        edits: &[EditRequest],
    ) -> CineforgeResult<EditCommit> {
        require_project_id(project_id)?;
        let blueprint = self.repository.require_blueprint(project_id).await?;
        let record = self.repository.require_story(project_id).await?;

        check_indexes(
            edits.iter().map(|edit| edit.scene_index),
            record.story.scenes.len(),
        )?;

        let mut session = EditSession::new(record.story.scenes.clone());

        let regenerated = try_join_all(
            edits
                .iter()
                .filter(|edit| edit.edit_type == EditType::Regenerate)
                .map(|edit| {
                    regenerate_scene(
                        adapter,
                        &blueprint,
                        edit.scene_index,
                        &session.original()[edit.scene_index],
                        &edit.instructions,
                        &self.settings,
                    )
                }),
        )
        .await?;
        let mut regenerated = regenerated.into_iter();

        let mut replacements = Vec::with_capacity(edits.len());
        for edit in edits {
            match edit.edit_type {
                EditType::Regenerate => {
                    if let Some(text) = regenerated.next() {
                        replacements.push((edit.scene_index, text));
                    }
                }
                EditType::Modify => {
                    if let Some(text) = &edit.replacement_text {
                        replacements.push((edit.scene_index, text.clone()));
                    }
                }
            }
        }
        session.apply_edits(replacements)?;

        let report = self
            .validator
            .validate_edit(
                adapter,
                &blueprint,
                session.original(),
                session.scenes(),
                &self.settings,
            )
            .await?;
        session.record_validation(report)?;

        match session.finish()? {
            EditOutcome::Rejected(violation) => {
                tracing::warn!(%violation, "Edit rejected");
                Err(violation.into())
            }
            EditOutcome::Committed { scenes, report } => {
                let story = record.story.with_scenes(scenes);
                let notes = ValidationNotes::from(&report);
                let stored = self
                    .repository
                    .commit_story_edit(project_id, &story, &notes)
                    .await?;
                self.repository
                    .advance_status(project_id, ProjectStatus::Stage2Complete)
                    .await;
                tracing::info!(
                    scene_count = stored.story.scenes.len(),
                    soft = notes.soft.len(),
                    warnings = notes.warnings.len(),
                    "Edit committed"
                );
                Ok(EditCommit {
                    story: stored,
                    report,
                })
            }
        }
    }
}
