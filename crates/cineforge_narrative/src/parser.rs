//! Response parser: free-form story text to [`StoryOutput`].
//!
//! Parsing never fails. Every missing piece has its own fallback rule, and
//! the rules that fired are reported alongside the story so callers can flag
//! a degraded result. Rejecting bad output is the validator's job.

use cineforge_core::{Blueprint, StoryOutput, count_words};
use serde::{Deserialize, Serialize};

/// Title used when the response names none.
pub const UNTITLED: &str = "Untitled Story";

const TITLE_MARKERS: &[&str] = &["STORY TITLE:", "Title:"];
const CONFIRMATION_MARKERS: &[&str] = &["CONSTRAINT CONFIRMATION:", "Confirmation:"];
const STORY_MARKER: &str = "STORY:";
const WORD_COUNT_MARKER: &str = "WORD COUNT:";

/// A fallback rule that had to stand in for a missing piece of the response.
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
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ParseFallback {
    /// No title marker; the placeholder title was used
    Title,
    /// No confirmation marker; a sentence was synthesized
    Confirmation,
    /// No stated word count; it was counted from the story text
    WordCount,
    /// No scene markers; the whole story became one scene
    Scenes,
    /// No story-start marker; the body starts at the first scene marker, or
    /// takes all unmarked text when there is none
    StoryBody,
}

/// Parsed story plus the fallback rules that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStory {
    /// Best-effort story
    pub story: StoryOutput,
    /// Fallbacks applied, in rule order
    pub fallbacks: Vec<ParseFallback>,
}

impl ParsedStory {
    /// True when every piece came from the response itself.
    pub fn is_exact(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

/// Parse generated text into a story. Never fails.
///
/// # Examples
///
/// ```
/// use cineforge_core::{Blueprint, Narration};
/// use cineforge_narrative::parse_story;
///
/// let blueprint = Blueprint::builder()
///     .core_idea("A lighthouse keeper finds a message in a bottle")
///     .genre("Drama")
///     .tone_mood("Melancholic")
///     .word_count(900u32)
///     .narration(Narration::ThirdPerson)
///     .scene_count(2u32)
///     .characters(vec!["Ava".to_string()])
///     .build()
///     .unwrap();
///
/// let raw = "**STORY TITLE:** Salt\n\nSTORY:\nScene 1: Grey water.\n\nScene 2: Still gulls.\n";
/// let story = parse_story(raw, &blueprint);
/// assert_eq!(story.title, "Salt");
/// assert_eq!(story.scenes, vec!["Grey water.", "Still gulls."]);
/// assert_eq!(story.word_count_actual, 4);
/// ```
pub fn parse_story(raw: &str, blueprint: &Blueprint) -> StoryOutput {
    parse_story_with_report(raw, blueprint).story
}

/// Parse generated text into a story and report which fallbacks fired.
#[tracing::instrument(skip(raw, blueprint), fields(raw_len = raw.len(), expected_scenes = blueprint.scene_count()))]
pub fn parse_story_with_report(raw: &str, blueprint: &Blueprint) -> ParsedStory {
    let sections = Sections::scan(raw);
    let mut fallbacks = Vec::new();

    let body = if sections.saw_story_marker {
        sections.body
    } else {
        fallbacks.push(ParseFallback::StoryBody);
        fallback_body(sections.unmarked)
    };

    let split = split_scenes(&body);
    let scenes = if split.marker_count == 0 {
        fallbacks.push(ParseFallback::Scenes);
        fallback_scenes(&split.story_text)
    } else {
        split.scenes
    };

    let word_count = match sections.stated_word_count {
        Some(count) => count,
        None => {
            fallbacks.push(ParseFallback::WordCount);
            fallback_word_count(&split.story_text)
        }
    };

    let title = match sections.title {
        Some(title) => title,
        None => {
            fallbacks.push(ParseFallback::Title);
            fallback_title()
        }
    };

    let constraints_confirmation = match sections.confirmation {
        Some(confirmation) => confirmation,
        None => {
            fallbacks.push(ParseFallback::Confirmation);
            fallback_confirmation(scenes.len(), word_count)
        }
    };

    if !fallbacks.is_empty() {
        tracing::warn!(?fallbacks, "Story response parsed with fallbacks");
    }

    ParsedStory {
        story: StoryOutput {
            title,
            story_text: split.story_text,
            word_count_actual: word_count,
            constraints_confirmation,
            scenes,
        },
        fallbacks,
    }
}

pub(crate) fn fallback_title() -> String {
    UNTITLED.to_string()
}

pub(crate) fn fallback_confirmation(scene_count: usize, word_count: u32) -> String {
    format!(
        "Story generated with {} scenes and approximately {} words.",
        scene_count, word_count
    )
}

pub(crate) fn fallback_word_count(story_text: &str) -> u32 {
    count_words(story_text)
}

pub(crate) fn fallback_scenes(story_text: &str) -> Vec<String> {
    vec![story_text.to_string()]
}

/// Body without a story-start marker: from the first scene marker on, or
/// every unmarked line when there is none.
pub(crate) fn fallback_body(mut unmarked: Vec<String>) -> Vec<String> {
    match unmarked.iter().position(|line| scene_marker(line).is_some()) {
        Some(first) => unmarked.split_off(first),
        None => unmarked,
    }
}

/// Line-level pass over the response.
#[derive(Debug, Default)]
struct Sections {
    title: Option<String>,
    confirmation: Option<String>,
    stated_word_count: Option<u32>,
    saw_story_marker: bool,
    saw_word_count: bool,
    /// Lines after the story-start marker, up to the word-count marker
    body: Vec<String>,
    /// Lines that are neither a marker nor a marker value, up to the
    /// word-count marker
    unmarked: Vec<String>,
}

impl Sections {
    fn scan(raw: &str) -> Self {
        let lines: Vec<&str> = raw.lines().collect();
        let mut sections = Sections::default();
        let mut in_body = false;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let clean = strip_emphasis(line);

            if let Some(rest) = TITLE_MARKERS
                .iter()
                .find_map(|marker| after_marker(&clean, marker))
            {
                if let Some(title) = value_or_next(rest, &lines, &mut i) {
                    sections.title.get_or_insert(title);
                }
            } else if let Some(rest) = CONFIRMATION_MARKERS
                .iter()
                .find_map(|marker| after_marker(&clean, marker))
            {
                if let Some(confirmation) = value_or_next(rest, &lines, &mut i) {
                    sections.confirmation.get_or_insert(confirmation);
                }
            } else if let Some(rest) = after_marker(&clean, WORD_COUNT_MARKER) {
                in_body = false;
                sections.saw_word_count = true;
                let stated = match first_number(rest) {
                    Some(count) => Some(count),
                    None => next_non_empty(&lines, i).and_then(|next| {
                        let count = first_number(&strip_emphasis(lines[next]));
                        if count.is_some() {
                            i = next;
                        }
                        count
                    }),
                };
                if sections.stated_word_count.is_none() {
                    sections.stated_word_count = stated;
                }
            } else if let Some(rest) = after_marker(&clean, STORY_MARKER) {
                in_body = true;
                sections.saw_story_marker = true;
                if !rest.is_empty() {
                    sections.body.push(rest.to_string());
                    sections.unmarked.push(rest.to_string());
                }
            } else {
                if in_body {
                    sections.body.push(line.to_string());
                }
                if !sections.saw_word_count {
                    sections.unmarked.push(line.to_string());
                }
            }

            i += 1;
        }

        sections
    }
}

/// Line with markdown emphasis and heading hashes removed from both ends.
fn strip_emphasis(line: &str) -> String {
    line.trim()
        .trim_start_matches(['#', '*', '_', ' '])
        .trim_end_matches(['*', '_', ' '])
        .replace("**", "")
}

/// Text after `marker` when the line contains it.
fn after_marker<'a>(clean: &'a str, marker: &str) -> Option<&'a str> {
    clean
        .find(marker)
        .map(|pos| clean[pos + marker.len()..].trim())
}

/// Marker value from the marker line, else from the next non-empty line.
fn value_or_next(rest: &str, lines: &[&str], i: &mut usize) -> Option<String> {
    let rest = rest.trim_matches(['*', '"', ' ']);
    if !rest.is_empty() {
        return Some(rest.to_string());
    }
    let next = next_non_empty(lines, *i)?;
    *i = next;
    let value = strip_emphasis(lines[next]);
    let value = value.trim_matches(['"', ' ']);
    (!value.is_empty()).then(|| value.to_string())
}

fn next_non_empty(lines: &[&str], from: usize) -> Option<usize> {
    (from + 1..lines.len()).find(|&j| !lines[j].trim().is_empty())
}

fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Remainder of a `Scene <n>:` marker line, or `None` for other lines.
///
/// Leading emphasis and heading characters are ignored.
pub(crate) fn scene_marker(line: &str) -> Option<&str> {
    let line = line.trim().trim_start_matches(['*', '#', '_', ' ']);
    let rest = line.strip_prefix("Scene")?;
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 {
        return None;
    }
    let rest = trimmed[digits_end..].trim_start().strip_prefix(':')?;
    Some(rest.trim_start_matches(['*', '_']).trim())
}

struct SceneSplit {
    scenes: Vec<String>,
    story_text: String,
    marker_count: usize,
}

/// Split body lines at scene markers. Every marker opens a scene, even an empty one.
fn split_scenes(body: &[String]) -> SceneSplit {
    let mut scenes: Vec<Vec<&str>> = Vec::new();
    let mut text_lines: Vec<&str> = Vec::new();
    let mut marker_count = 0;

    for line in body {
        match scene_marker(line) {
            Some(rest) => {
                marker_count += 1;
                let mut scene = Vec::new();
                if !rest.is_empty() {
                    scene.push(rest);
                    text_lines.push(rest);
                }
                scenes.push(scene);
            }
            None => {
                if let Some(scene) = scenes.last_mut() {
                    scene.push(line);
                }
                text_lines.push(line);
            }
        }
    }

    SceneSplit {
        scenes: scenes
            .into_iter()
            .map(|lines| lines.join("\n").trim().to_string())
            .collect(),
        story_text: text_lines.join("\n").trim().to_string(),
        marker_count,
    }
}
