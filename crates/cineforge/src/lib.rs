//! Cineforge - blueprint-driven cinematic story pipeline
//!
//! Cineforge turns a story blueprint (genre, tone, characters, scene count,
//! word count) into a validated multi-scene story, lets callers edit it with
//! model-assisted regeneration, and derives per-scene production blueprints
//! for downstream image and video generation.
//!
//! # Stages
//!
//! - **Stage 1**: blueprint → prompt → one generation call → parse → validate → store
//! - **Stage 2**: edit batches (regenerate/modify) validated all-or-nothing
//! - **Stage 3**: character profiles, shot and background blueprints per scene
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cineforge::{Blueprint, CineforgeConfig, Narration, Studio, init_telemetry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CineforgeConfig::load()?;
//!     init_telemetry(config.telemetry())?;
//!
//!     let studio = Studio::from_config(config)?;
//!     let blueprint = Blueprint::builder()
//!         .core_idea("A lighthouse keeper finds a message in a bottle")
//!         .genre("Drama")
//!         .tone_mood("Melancholic")
//!         .narration(Narration::ThirdPerson)
//!         .characters(vec!["Ava".to_string()])
//!         .scene_count(3u32)
//!         .word_count(600u32)
//!         .build()?;
//!
//!     let story = studio.generate_story("lighthouse", &blueprint, None).await?;
//!     println!("{}", story.story.title);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `cineforge_error` - Error types and HTTP status mapping
//! - `cineforge_core` - Blueprints, stories, validation reports, records
//! - `cineforge_interface` - `GenerationAdapter` and `RecordStore` traits
//! - `cineforge_cache` - Adapter instance cache
//! - `cineforge_storage` - In-memory and filesystem record stores
//! - `cineforge_models` - OpenRouter and FAL adapters, adapter factory
//! - `cineforge_narrative` - Prompt compiler, parser, validator, editor, production
//!
//! This crate (`cineforge`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod studio;
pub mod telemetry;

pub use config::{CineforgeConfig, StorageBackend, StorageConfig};
pub use studio::{FAL_AI_KEY_VAR, OPENROUTER_KEY_VAR, Studio};
pub use telemetry::{TelemetryConfig, init_telemetry};

// Re-export workspace crates
pub use cineforge_cache::{InstanceCache, InstanceCacheConfig};
pub use cineforge_core::*;
pub use cineforge_error::*;
pub use cineforge_interface::*;
pub use cineforge_models::{
    AdapterConfig, AdapterFactory, AdapterFamily, FalAiAdapter, FalAiSettings, OpenRouterAdapter,
    OpenRouterSettings, PRESETS, ProviderSettings,
};
pub use cineforge_narrative::{
    ConstraintValidator, EditCommit, EditOrchestrator, EditOutcome, EditSession, EditState,
    GeneratedStory, GenerationSettings, ProductionDesigner, ProductionPlan, ProjectRepository,
    StageSettings, StoryGenerator, StyleRules, parse_story, system_prompts,
};
pub use cineforge_storage::{FileSystemRecordStore, InMemoryRecordStore};
