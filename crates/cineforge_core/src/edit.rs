//! Edit requests submitted against a stored story.

use serde::{Deserialize, Serialize};

/// How an edit changes its scene.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EditType {
    /// Text was replaced out of band by the caller
    Modify,
    /// Scene is rewritten by the generation backend
    Regenerate,
}

/// One user-submitted change instruction.
///
/// # Examples
///
/// ```
/// use cineforge_core::{EditRequest, EditType};
///
/// let edit = EditRequest::regenerate(1, "Make the harbour colder");
/// assert_eq!(edit.edit_type, EditType::Regenerate);
///
/// let json = serde_json::to_value(&edit).unwrap();
/// assert_eq!(json["sceneIndex"], 1);
/// assert_eq!(json["editType"], "regenerate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    /// 0-based scene index, must be below the current scene count
    pub scene_index: usize,
    /// Modify or regenerate
    pub edit_type: EditType,
    /// Free-text instructions
    #[serde(default)]
    pub instructions: String,
    /// Final scene text for modify edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_text: Option<String>,
}

impl EditRequest {
    /// Edit that asks the model to rewrite one scene.
    pub fn regenerate(scene_index: usize, instructions: impl Into<String>) -> Self {
        Self {
            scene_index,
            edit_type: EditType::Regenerate,
            instructions: instructions.into(),
            replacement_text: None,
        }
    }

    /// Edit carrying caller-supplied final text.
    pub fn modify(scene_index: usize, replacement_text: impl Into<String>) -> Self {
        Self {
            scene_index,
            edit_type: EditType::Modify,
            instructions: String::new(),
            replacement_text: Some(replacement_text.into()),
        }
    }
}
