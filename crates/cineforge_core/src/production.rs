//! Production blueprints derived from a validated story.

use serde::{Deserialize, Serialize};

/// Placeholder used for any profile field the model left out.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Camera framing for a scene.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum ShotType {
    /// Establishing or wide framing
    Wide,
    /// Waist-up framing
    #[default]
    Medium,
    /// Face or detail framing
    #[serde(rename = "Close-up")]
    #[strum(serialize = "Close-up")]
    CloseUp,
}

impl ShotType {
    /// Maps a free-form label onto a known framing; anything unrecognised is Medium.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_core::ShotType;
    ///
    /// assert_eq!(ShotType::normalize("Extreme Wide / Establishing"), ShotType::Wide);
    /// assert_eq!(ShotType::normalize("medium close-up"), ShotType::CloseUp);
    /// assert_eq!(ShotType::normalize("cowboy"), ShotType::Medium);
    /// ```
    pub fn normalize(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("wide") || label.contains("establishing") {
            ShotType::Wide
        } else if label.contains("close") {
            ShotType::CloseUp
        } else {
            ShotType::Medium
        }
    }
}

/// Which side of the subject faces the camera.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum CameraView {
    /// Subject faces the camera
    #[default]
    Front,
    /// Three-quarter or side-on
    Side,
    /// Subject faces away
    Back,
    /// Over the shoulder
    #[serde(rename = "OTS")]
    #[strum(serialize = "OTS")]
    Ots,
    /// Strict profile
    Profile,
}

impl CameraView {
    /// Maps a free-form label onto a known view; anything unrecognised is Front.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_core::CameraView;
    ///
    /// assert_eq!(CameraView::normalize("over-the-shoulder"), CameraView::Ots);
    /// assert_eq!(CameraView::normalize("Back view"), CameraView::Back);
    /// assert_eq!(CameraView::normalize("3/4"), CameraView::Front);
    /// ```
    pub fn normalize(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("back") {
            CameraView::Back
        } else if label.contains("ots") || label.contains("over") {
            CameraView::Ots
        } else if label.contains("profile") {
            CameraView::Profile
        } else if label.contains("side") {
            CameraView::Side
        } else {
            CameraView::Front
        }
    }
}

/// Camera framing for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotBlueprint {
    /// Framing
    pub shot_type: ShotType,
    /// Camera angle description
    pub angle: String,
    /// Subject orientation
    pub view: CameraView,
    /// Blocking of characters in frame
    pub staging: String,
    /// Spatial relationship between characters, when several are present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relational_staging: Option<String>,
    /// What the shot does for the story
    pub scene_function: String,
}

impl Default for ShotBlueprint {
    fn default() -> Self {
        Self {
            shot_type: ShotType::Medium,
            angle: "Eye level".to_string(),
            view: CameraView::Front,
            staging: "Standard staging".to_string(),
            relational_staging: None,
            scene_function: "Advance narrative".to_string(),
        }
    }
}

/// Physical appearance of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Eye colour
    pub eyes: String,
    /// Skin tone
    pub skin: String,
    /// Hair description
    pub hair: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            eyes: NOT_SPECIFIED.to_string(),
            skin: NOT_SPECIFIED.to_string(),
            hair: NOT_SPECIFIED.to_string(),
        }
    }
}

/// Fixed outfit, split head to toe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    /// Upper garment
    pub upper: String,
    /// Lower garment
    pub lower: String,
    /// Footwear
    pub footwear: String,
}

impl Default for Outfit {
    fn default() -> Self {
        Self {
            upper: NOT_SPECIFIED.to_string(),
            lower: NOT_SPECIFIED.to_string(),
            footwear: NOT_SPECIFIED.to_string(),
        }
    }
}

/// Reference prompt snippets for one framing, per view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSet {
    /// Front view
    pub front: String,
    /// Side view
    pub side: String,
    /// Back view
    pub back: String,
}

impl SnippetSet {
    /// Generic snippets for a framing label such as "close-up".
    pub fn generic(framing: &str) -> Self {
        Self::for_subject("Character", framing)
    }

    /// Snippets naming a subject, e.g. "Ava close-up, front view".
    pub fn for_subject(subject: &str, framing: &str) -> Self {
        Self {
            front: format!("{} {}, front view", subject, framing),
            side: format!("{} {}, side view", subject, framing),
            back: format!("{} {}, back view", subject, framing),
        }
    }
}

/// Snippets for every framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotSnippets {
    /// Close-up snippets
    pub closeup: SnippetSet,
    /// Medium shot snippets
    pub medium: SnippetSet,
    /// Wide shot snippets
    pub wide: SnippetSet,
}

impl Default for ShotSnippets {
    fn default() -> Self {
        Self {
            closeup: SnippetSet::generic("close-up"),
            medium: SnippetSet::generic("medium shot"),
            wide: SnippetSet::generic("wide shot"),
        }
    }
}

/// Consistent visual profile for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Display name, matching the blueprint roster
    pub name: String,
    /// Physical appearance
    pub appearance: Appearance,
    /// Fixed outfit
    pub outfit: Outfit,
    /// Signature props
    #[serde(default)]
    pub props: Vec<String>,
    /// Reference snippets
    pub snippets: ShotSnippets,
}

impl CharacterProfile {
    /// Profile used when the model gave nothing usable for this character.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_core::CharacterProfile;
    ///
    /// let profile = CharacterProfile::placeholder("Ava");
    /// assert_eq!(profile.snippets.closeup.front, "Ava close-up, front view");
    /// assert_eq!(profile.outfit.footwear, "Sneakers");
    /// ```
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            appearance: Appearance {
                eyes: "Blue".to_string(),
                skin: "Fair".to_string(),
                hair: "Brown".to_string(),
            },
            outfit: Outfit {
                upper: "Casual shirt".to_string(),
                lower: "Jeans".to_string(),
                footwear: "Sneakers".to_string(),
            },
            props: Vec::new(),
            snippets: ShotSnippets {
                closeup: SnippetSet::for_subject(name, "close-up"),
                medium: SnippetSet::for_subject(name, "medium shot"),
                wide: SnippetSet::for_subject(name, "wide shot"),
            },
        }
    }
}

/// Set dressing and light for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundBlueprint {
    /// Primary location
    pub master_location: String,
    /// Elements layered over the location
    pub overlay_elements: Vec<String>,
    /// Lighting description
    pub lighting: String,
    /// Weather, particles, air
    pub atmospheric_details: String,
}

impl Default for BackgroundBlueprint {
    fn default() -> Self {
        Self {
            master_location: "Interior setting".to_string(),
            overlay_elements: vec!["Standard elements".to_string()],
            lighting: "Soft, natural lighting".to_string(),
            atmospheric_details: "Clear, neutral atmosphere".to_string(),
        }
    }
}

impl BackgroundBlueprint {
    /// Blueprint used when the response held no parsable JSON at all.
    pub fn fallback() -> Self {
        Self {
            master_location: "Scene setting".to_string(),
            overlay_elements: vec!["Props".to_string(), "Furniture".to_string()],
            lighting: "Natural lighting".to_string(),
            atmospheric_details: "Neutral atmosphere".to_string(),
        }
    }
}
