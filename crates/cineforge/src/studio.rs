//! Composition root: every boundary operation behind one service.

use crate::config::{CineforgeConfig, StorageBackend};
use cineforge_core::{
    Blueprint, EditRequest, Modality, SceneRecord, ShotBlueprint, StoryRecord, ValidationOutput,
};
use cineforge_error::{CineforgeResult, InputError, InputErrorKind};
use cineforge_interface::{GenerationAdapter, RecordStore};
use cineforge_models::{AdapterConfig, AdapterFactory};
use cineforge_narrative::{
    ConstraintValidator, EditCommit, EditOrchestrator, ProductionDesigner, ProductionPlan,
    ProjectRepository, StoryGenerator, regenerate_scene, require_project_id,
};
use cineforge_storage::{FileSystemRecordStore, InMemoryRecordStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Environment variable holding the OpenRouter credential.
pub const OPENROUTER_KEY_VAR: &str = "OPENROUTER_API_KEY";
/// Environment variable holding the FAL credential.
pub const FAL_AI_KEY_VAR: &str = "FAL_AI_API_KEY";

/// Per-call credential, else the environment (a `.env` file included).
fn resolve_credential(credential: Option<&str>, env_var: &str) -> Result<String, InputError> {
    if let Some(credential) = credential.map(str::trim).filter(|c| !c.is_empty()) {
        return Ok(credential.to_string());
    }
    let _ = dotenvy::dotenv();
    std::env::var(env_var)
        .ok()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| InputError::new(InputErrorKind::MissingField("credential".to_string())))
}

/// The story pipeline, wired.
///
/// Owns the configuration, the adapter factory (and with it the adapter
/// cache) and the project repository. Credentials are supplied per call.
///
/// # Example
///
/// ```rust,ignore
/// use cineforge::{CineforgeConfig, Studio};
///
/// # async fn example(blueprint: cineforge::Blueprint) -> cineforge::CineforgeResult<()> {
/// let studio = Studio::from_config(CineforgeConfig::load()?)?;
/// let story = studio.generate_story("lighthouse", &blueprint, Some("sk-or-...")).await?;
/// println!("{}", story.story.title);
/// # Ok(())
/// # }
/// ```
pub struct Studio {
    config: CineforgeConfig,
    factory: AdapterFactory,
    repository: ProjectRepository,
    generator: StoryGenerator,
    editor: EditOrchestrator,
    designer: ProductionDesigner,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .field("cached_adapters", &self.factory.cached_count())
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Studio over an explicit record store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the validator rules do not compile.
    pub fn new(config: CineforgeConfig, store: Arc<dyn RecordStore>) -> CineforgeResult<Self> {
        let repository = ProjectRepository::new(store);
        let validator = ConstraintValidator::with_default_rules()?;
        let stages = config.stages().clone();
        let factory = AdapterFactory::new(config.providers().clone(), config.cache().clone());

        Ok(Self {
            generator: StoryGenerator::new(repository.clone(), validator.clone(), stages.clone()),
            editor: EditOrchestrator::new(repository.clone(), validator, stages.clone()),
            designer: ProductionDesigner::new(repository.clone(), stages),
            config,
            factory,
            repository,
        })
    }

    /// Studio with the record store named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the filesystem root cannot be created.
    #[instrument(skip(config), fields(backend = %config.storage().backend()))]
    pub fn from_config(config: CineforgeConfig) -> CineforgeResult<Self> {
        let store: Arc<dyn RecordStore> = match config.storage().backend() {
            StorageBackend::Memory => Arc::new(InMemoryRecordStore::new()),
            StorageBackend::Filesystem => {
                Arc::new(FileSystemRecordStore::new(config.storage().path().clone())?)
            }
        };
        Self::new(config, store)
    }

    /// Active configuration.
    pub fn config(&self) -> &CineforgeConfig {
        &self.config
    }

    /// Adapter factory; pre-seed it with [`AdapterFactory::insert`].
    pub fn factory(&self) -> &AdapterFactory {
        &self.factory
    }

    /// Typed project records.
    pub fn repository(&self) -> &ProjectRepository {
        &self.repository
    }

    /// Text adapter for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`InputErrorKind::MissingField`] for `credential` when neither
    /// the call nor the environment supplies one.
    pub fn text_adapter(
        &self,
        model: &str,
        credential: Option<&str>,
    ) -> CineforgeResult<Arc<dyn GenerationAdapter>> {
        let credential = resolve_credential(credential, OPENROUTER_KEY_VAR)?;
        self.factory
            .adapter(&AdapterConfig::openrouter(model, credential))
    }

    /// Media adapter for `modality`, on the configured default endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`InputErrorKind::MissingField`] for `credential` when neither
    /// the call nor the environment supplies one.
    pub fn media_adapter(
        &self,
        modality: Modality,
        credential: Option<&str>,
    ) -> CineforgeResult<Arc<dyn GenerationAdapter>> {
        let credential = resolve_credential(credential, FAL_AI_KEY_VAR)?;
        self.factory.adapter(&AdapterConfig::falai(modality, credential))
    }

    /// Text adapter for the model the project's blueprint selected.
    async fn project_adapter(
        &self,
        project_id: &str,
        credential: Option<&str>,
    ) -> CineforgeResult<Arc<dyn GenerationAdapter>> {
        let model = match self.repository.blueprint(project_id).await? {
            Some(blueprint) => blueprint.selected_model().clone(),
            None => self.config.providers().openrouter().default_model().clone(),
        };
        debug!(%model, "Resolved project model");
        self.text_adapter(&model, credential)
    }

    /// Stage 1: generate, validate and store a story.
    ///
    /// # Errors
    ///
    /// Input errors (blueprint, project id, credential) before any call,
    /// provider errors, and a constraint violation on hard findings.
    #[instrument(skip(self, blueprint, credential))]
    pub async fn generate_story(
        &self,
        project_id: &str,
        blueprint: &Blueprint,
        credential: Option<&str>,
    ) -> CineforgeResult<StoryRecord> {
        require_project_id(project_id)?;
        blueprint.validate()?;
        let adapter = self.text_adapter(blueprint.selected_model(), credential)?;
        self.generator
            .generate_for_project(project_id, adapter.as_ref(), blueprint)
            .await
    }

    /// Stored story.
    ///
    /// # Errors
    ///
    /// Not found when the project has no story.
    pub async fn story(&self, project_id: &str) -> CineforgeResult<StoryRecord> {
        require_project_id(project_id)?;
        self.repository.require_story(project_id).await
    }

    /// Validates candidate scenes against the stored story without writing.
    ///
    /// # Errors
    ///
    /// Not found when the blueprint or story is missing; provider errors
    /// from the semantic pass.
    #[instrument(skip(self, edited_scenes, credential), fields(scene_count = edited_scenes.len()))]
    pub async fn validate_story(
        &self,
        project_id: &str,
        edited_scenes: &[String],
        credential: Option<&str>,
    ) -> CineforgeResult<ValidationOutput> {
        require_project_id(project_id)?;
        let blueprint = self.repository.require_blueprint(project_id).await?;
        let story = self.repository.require_story(project_id).await?;
        let adapter = self.text_adapter(blueprint.selected_model(), credential)?;
        self.generator
            .validator()
            .validate_edit(
                adapter.as_ref(),
                &blueprint,
                &story.story.scenes,
                edited_scenes,
                self.config.stages(),
            )
            .await
    }

    /// Rewrites one stored scene and returns the candidate text without
    /// writing it.
    ///
    /// # Errors
    ///
    /// Scene index out of range before any call, not found for a missing
    /// blueprint or story, provider errors.
    #[instrument(skip(self, instructions, credential))]
    pub async fn regenerate_scene(
        &self,
        project_id: &str,
        scene_index: usize,
        instructions: &str,
        credential: Option<&str>,
    ) -> CineforgeResult<String> {
        require_project_id(project_id)?;
        let blueprint = self.repository.require_blueprint(project_id).await?;
        let story = self.repository.require_story(project_id).await?;
        let current = story.story.scenes.get(scene_index).ok_or_else(|| {
            InputError::new(InputErrorKind::SceneIndexOutOfRange {
                index: scene_index,
                scene_count: story.story.scenes.len(),
            })
        })?;
        let adapter = self.text_adapter(blueprint.selected_model(), credential)?;
        regenerate_scene(
            adapter.as_ref(),
            &blueprint,
            scene_index,
            current,
            instructions,
            self.config.stages(),
        )
        .await
    }

    /// Stage 2: applies an edit batch all-or-nothing.
    ///
    /// # Errors
    ///
    /// See [`EditOrchestrator::edit_story`].
    #[instrument(skip(self, edits, credential), fields(edit_count = edits.len()))]
    pub async fn edit_story(
        &self,
        project_id: &str,
        edits: &[EditRequest],
        credential: Option<&str>,
    ) -> CineforgeResult<EditCommit> {
        require_project_id(project_id)?;
        let adapter = self.project_adapter(project_id, credential).await?;
        self.editor
            .edit_story(project_id, adapter.as_ref(), edits)
            .await
    }

    /// Stage 3: character, shot and background blueprints for every scene.
    ///
    /// # Errors
    ///
    /// See [`ProductionDesigner::design_project`].
    #[instrument(skip(self, custom_prompt, credential))]
    pub async fn design_production(
        &self,
        project_id: &str,
        custom_prompt: Option<&str>,
        credential: Option<&str>,
    ) -> CineforgeResult<ProductionPlan> {
        require_project_id(project_id)?;
        let adapter = self.project_adapter(project_id, credential).await?;
        self.designer
            .design_project(project_id, adapter.as_ref(), custom_prompt)
            .await
    }

    /// Stored scene blueprints, by index.
    pub async fn scenes(&self, project_id: &str) -> CineforgeResult<Vec<SceneRecord>> {
        require_project_id(project_id)?;
        self.repository.scenes(project_id).await
    }

    /// Redesigns the shot of one unlocked scene.
    ///
    /// # Errors
    ///
    /// See [`ProductionDesigner::regenerate_shot`].
    #[instrument(skip(self, credential))]
    pub async fn regenerate_shot(
        &self,
        project_id: &str,
        scene_index: usize,
        credential: Option<&str>,
    ) -> CineforgeResult<ShotBlueprint> {
        require_project_id(project_id)?;
        let adapter = self.project_adapter(project_id, credential).await?;
        self.designer
            .regenerate_shot(project_id, scene_index, adapter.as_ref())
            .await
    }

    /// Locks a scene against regeneration.
    pub async fn lock_scene(
        &self,
        project_id: &str,
        scene_index: usize,
    ) -> CineforgeResult<SceneRecord> {
        self.designer.lock_scene(project_id, scene_index).await
    }

    /// Unlocks a scene.
    pub async fn unlock_scene(
        &self,
        project_id: &str,
        scene_index: usize,
    ) -> CineforgeResult<SceneRecord> {
        self.designer.unlock_scene(project_id, scene_index).await
    }

    /// Drops every cached adapter.
    pub fn clear_adapter_cache(&self) {
        self.factory.clear_cache();
    }
}
