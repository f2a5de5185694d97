//! Story pipeline for Cineforge.
//!
//! This crate turns a narrative blueprint into a validated, editable story
//! and then into production blueprints:
//!
//! - **Prompt compiler**: deterministic blueprint-to-prompt rendering
//! - **Response parser**: free-form story text to structured scenes, never failing
//! - **Constraint validator**: structural pass plus an optional semantic pass
//! - **Edit orchestrator**: all-or-nothing scene edits with regeneration
//! - **Production designer**: shot, background and character blueprints
//!
//! # Example
//!
//! ```rust,ignore
//! use cineforge_narrative::{ConstraintValidator, ProjectRepository, StageSettings, StoryGenerator};
//! use cineforge_storage::InMemoryRecordStore;
//! use std::sync::Arc;
//!
//! # async fn example(adapter: &dyn cineforge_interface::GenerationAdapter, blueprint: cineforge_core::Blueprint) -> cineforge_error::CineforgeResult<()> {
//! let repository = ProjectRepository::new(Arc::new(InMemoryRecordStore::new()));
//! let generator = StoryGenerator::new(
//!     repository,
//!     ConstraintValidator::with_default_rules()?,
//!     StageSettings::default(),
//! );
//! let record = generator.generate_for_project("lighthouse", adapter, &blueprint).await?;
//! println!("{} ({} words)", record.story.title, record.story.word_count_actual);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod call;
mod editor;
mod extraction;
mod generator;
mod parser;
mod production;
mod prompt;
mod repository;
mod settings;
pub mod system_prompts;
mod validator;

pub use call::generate_text;
pub use editor::{
    EditCommit, EditOrchestrator, EditOutcome, EditSession, EditState, regenerate_scene,
};
pub use extraction::{extract_json, extract_json_object, parse_json};
pub use generator::{GeneratedStory, StoryGenerator};
pub use parser::{ParseFallback, ParsedStory, UNTITLED, parse_story, parse_story_with_report};
pub use production::{
    ProductionDesigner, ProductionPlan, parse_background_blueprint, parse_character_profiles,
    parse_shot_blueprint,
};
pub use prompt::{
    CompiledPrompt, NARRATIVE_LOGIC_PRIORITY, SceneEditContext, compile_background_blueprint,
    compile_character_profiles, compile_scene_regeneration, compile_shot_blueprint,
    compile_story, compile_validation,
};
pub use repository::{ProjectRepository, require_project_id};
pub use settings::{GenerationSettings, StageSettings};
pub use validator::{
    ConstraintValidator, MANUAL_REVIEW_WARNING, StyleRules, constraint_violation,
    parse_validation_response, scene_count_issue, word_count_issue,
};
