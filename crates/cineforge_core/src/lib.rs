//! Core data types for the Cineforge story pipeline.
//!
//! This crate provides the plain data model shared by every stage: the
//! blueprint contract, the generated story, validation reports, edit
//! requests, production blueprints and the generation request/response
//! shapes exchanged with adapters.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blueprint;
mod edit;
mod generation;
mod production;
mod records;
mod story;
mod validation;

pub use blueprint::{Blueprint, BlueprintBuilder, Narration, WordCountWindow};
pub use edit::{EditRequest, EditType};
pub use generation::{
    GenerationOutput, GenerationParams, GenerationParamsBuilder, GenerationResult,
    ModelCapabilities, Modality, Usage,
};
pub use production::{
    Appearance, BackgroundBlueprint, CameraView, CharacterProfile, Outfit, ShotBlueprint,
    ShotSnippets, ShotType, SnippetSet, NOT_SPECIFIED,
};
pub use records::{
    CharacterRecord, ProjectRecord, ProjectStatus, SceneRecord, StoryRecord, ValidationNotes,
};
pub use story::{StoryOutput, count_words};
pub use validation::{Severity, ValidationIssue, ValidationOutput};
