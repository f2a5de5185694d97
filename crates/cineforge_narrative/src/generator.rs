//! Stage 1: blueprint to validated story.

use crate::{
    ConstraintValidator, ParseFallback, ProjectRepository, StageSettings, call::generate_text,
    compile_story, parse_story_with_report, repository::require_project_id,
    validator::constraint_violation,
};
use chrono::Utc;
use cineforge_core::{Blueprint, ProjectStatus, StoryOutput, StoryRecord, ValidationOutput};
use cineforge_error::CineforgeResult;
use cineforge_interface::GenerationAdapter;

/// A story that passed the structural pass.
#[derive(Debug, Clone)]
pub struct GeneratedStory {
    /// Parsed story
    pub story: StoryOutput,
    /// Structural report; soft findings only
    pub report: ValidationOutput,
    /// Parser fallbacks that fired
    pub fallbacks: Vec<ParseFallback>,
}

/// Generates stories from blueprints.
#[derive(Debug, Clone)]
pub struct StoryGenerator {
    repository: ProjectRepository,
    validator: ConstraintValidator,
    settings: StageSettings,
}

impl StoryGenerator {
    /// Generator over the given collaborators.
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

    /// Validator used for the structural pass.
    pub fn validator(&self) -> &ConstraintValidator {
        &self.validator
    }

    /// Blueprint → prompt → one generation call → parse → structural pass.
    ///
    /// # Errors
    ///
    /// Input errors for an invalid blueprint (before any call), provider
    /// errors from the call, and a constraint violation when the parsed
    /// story breaks a hard constraint.
    #[tracing::instrument(
        skip(self, adapter, blueprint),
        fields(
            model = adapter.model_name(),
            scene_count = blueprint.scene_count(),
            word_count = blueprint.word_count(),
        )
    )]
    pub async fn generate(
        &self,
        adapter: &dyn GenerationAdapter,
        blueprint: &Blueprint,
    ) -> CineforgeResult<GeneratedStory> {
        blueprint.validate()?;

        let prompt = compile_story(blueprint);
        let raw = generate_text(
            adapter,
            &prompt.to_params(self.settings.story()),
            *self.settings.call_timeout_secs(),
        )
        .await?;

        let parsed = parse_story_with_report(&raw, blueprint);
        let report = self.validator.validate_story(blueprint, &parsed.story);
        if let Some(violation) = constraint_violation(&report) {
            tracing::warn!(%violation, "Generated story rejected");
            return Err(violation.into());
        }

        tracing::info!(
            title = %parsed.story.title,
            words = parsed.story.word_count_actual,
            warnings = report.warnings().len(),
            "Story generated"
        );
        Ok(GeneratedStory {
            story: parsed.story,
            report,
            fallbacks: parsed.fallbacks,
        })
    }

    /// Generates a story and stores it with its blueprint.
    ///
    /// Nothing is written unless generation succeeds. Writes run in order:
    /// the story (validated, soft findings attached), then the blueprint,
    /// then the project status `stage1_complete`. A failed status write is
    /// logged only.
    ///
    /// # Errors
    ///
    /// Everything [`StoryGenerator::generate`] returns, plus store failures.
    #[tracing::instrument(skip(self, adapter, blueprint))]
    pub async fn generate_for_project(
        &self,
        project_id: &str,
        adapter: &dyn GenerationAdapter,
        blueprint: &Blueprint,
    ) -> CineforgeResult<StoryRecord> {
        require_project_id(project_id)?;
        let generated = self.generate(adapter, blueprint).await?;

        let record = StoryRecord {
            project_id: project_id.to_string(),
            validation_notes: (&generated.report).into(),
            story: generated.story,
            is_validated: true,
            updated_at: Utc::now(),
        };
        self.repository.save_story(&record).await?;
        self.repository.save_blueprint(project_id, blueprint).await?;
        self.repository
            .advance_status(project_id, ProjectStatus::Stage1Complete)
            .await;
        Ok(record)
    }
}
