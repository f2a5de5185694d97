//! The generated narrative artifact.

use serde::{Deserialize, Serialize};

/// Counts whitespace-separated, non-empty tokens.
///
/// # Examples
///
/// ```
/// use cineforge_core::count_words;
///
/// assert_eq!(count_words("  The  tide\nturned. "), 3);
/// assert_eq!(count_words(""), 0);
/// ```
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Generated story, one per project, mutable across edit cycles.
///
/// `scenes` is meant to hold exactly `Blueprint::scene_count` entries but
/// may diverge when the model ignores the instruction; the validator is
/// responsible for catching that.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryOutput {
    /// Story title
    pub title: String,
    /// Full concatenated story text
    pub story_text: String,
    /// Word count of the story
    pub word_count_actual: u32,
    /// One-sentence summary of how the constraints were met
    pub constraints_confirmation: String,
    /// Ordered scene texts
    pub scenes: Vec<String>,
}

impl StoryOutput {
    /// Separator placed between scenes when the story text is re-derived.
    pub const SCENE_SEPARATOR: &'static str = "\n\n";

    /// Story with the given scenes, deriving the text and word count.
    ///
    /// # Examples
    ///
    /// ```
    /// use cineforge_core::StoryOutput;
    ///
    /// let story = StoryOutput::from_scenes(
    ///     "Tides",
    ///     "Story generated with 2 scenes and approximately 4 words.",
    ///     vec!["Grey water.".to_string(), "Still gulls.".to_string()],
    /// );
    /// assert_eq!(story.word_count_actual, 4);
    /// assert_eq!(story.story_text, "Grey water.\n\nStill gulls.");
    /// ```
    pub fn from_scenes(
        title: impl Into<String>,
        constraints_confirmation: impl Into<String>,
        scenes: Vec<String>,
    ) -> Self {
        let story_text = scenes.join(Self::SCENE_SEPARATOR);
        Self {
            title: title.into(),
            word_count_actual: count_words(&story_text),
            story_text,
            constraints_confirmation: constraints_confirmation.into(),
            scenes,
        }
    }

    /// Copy of this story with its scene list fully replaced.
    ///
    /// Story text and word count are re-derived from the new scenes.
    pub fn with_scenes(&self, scenes: Vec<String>) -> Self {
        Self::from_scenes(
            self.title.clone(),
            self.constraints_confirmation.clone(),
            scenes,
        )
    }

    /// Number of scenes currently held.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }
}
