//! Record shapes persisted through the record store.

use crate::{
    BackgroundBlueprint, CharacterProfile, ShotBlueprint, StoryOutput, ValidationIssue,
    ValidationOutput,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Furthest pipeline stage a project has completed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ProjectStatus {
    /// Nothing generated yet
    #[default]
    #[serde(rename = "draft")]
    #[strum(serialize = "draft")]
    Draft,
    /// Story generated and structurally validated
    #[serde(rename = "stage1_complete")]
    #[strum(serialize = "stage1_complete")]
    Stage1Complete,
    /// Story edits committed
    #[serde(rename = "stage2_complete")]
    #[strum(serialize = "stage2_complete")]
    Stage2Complete,
    /// Production blueprints generated
    #[serde(rename = "stage3_complete")]
    #[strum(serialize = "stage3_complete")]
    Stage3Complete,
}

/// Project header record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Project id
    pub id: String,
    /// Furthest completed stage
    pub status: ProjectStatus,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

/// Soft findings kept alongside a committed story for later display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationNotes {
    /// Soft findings
    #[serde(default)]
    pub soft: Vec<ValidationIssue>,
    /// Free-text warnings
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationNotes {
    /// True when there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.soft.is_empty() && self.warnings.is_empty()
    }
}

impl From<&ValidationOutput> for ValidationNotes {
    fn from(report: &ValidationOutput) -> Self {
        Self {
            soft: report.soft_errors().cloned().collect(),
            warnings: report.warnings().to_vec(),
        }
    }
}

/// Stored story, one per project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    /// Owning project
    pub project_id: String,
    /// The story itself
    #[serde(flatten)]
    pub story: StoryOutput,
    /// Whether the current scenes passed validation
    pub is_validated: bool,
    /// Soft findings from the last validation
    #[serde(default)]
    pub validation_notes: ValidationNotes,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

/// Stored production blueprint for one scene, keyed by project and index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    /// Owning project
    pub project_id: String,
    /// 0-based scene index
    pub scene_index: usize,
    /// Scene text the blueprints were derived from
    pub scene_text: String,
    /// Camera framing
    pub shot: ShotBlueprint,
    /// Set dressing and light
    pub background: BackgroundBlueprint,
    /// Locked scenes are skipped by regeneration
    #[serde(default)]
    pub is_locked: bool,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

/// Stored character profile, keyed by project and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    /// Owning project
    pub project_id: String,
    /// The profile
    #[serde(flatten)]
    pub profile: CharacterProfile,
    /// Last write
    pub updated_at: DateTime<Utc>,
}
