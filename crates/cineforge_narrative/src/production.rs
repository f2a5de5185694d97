//! Stage 3: production blueprints for a validated story.
//!
//! Each blueprint follows the same pattern as the story itself: compile a
//! prompt, make one call, then read JSON with a default for every field the
//! model left out. A response with no usable JSON falls back to a complete
//! default record instead of failing.

use crate::{
    CompiledPrompt, GenerationSettings, ProjectRepository, StageSettings, call::generate_text, compile_background_blueprint,
    compile_character_profiles, compile_shot_blueprint, extraction::extract_json,
    repository::require_project_id,
};
use chrono::Utc;
use cineforge_core::{
    Appearance, BackgroundBlueprint, CameraView, CharacterProfile, CharacterRecord, Outfit,
    ProjectStatus, SceneRecord, ShotBlueprint, ShotSnippets, ShotType, SnippetSet,
};
use cineforge_error::{
    CineforgeResult, InputError, InputErrorKind, NarrativeError, NarrativeErrorKind,
};
use cineforge_interface::GenerationAdapter;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// First non-empty string among `keys`.
fn text_field<'a>(value: &'a JsonValue, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(JsonValue::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn text_or(value: &JsonValue, keys: &[&str], default: &str) -> String {
    text_field(value, keys).unwrap_or(default).to_string()
}

fn string_list(value: &JsonValue, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
}

fn parsed_json(response: &str) -> Option<JsonValue> {
    let json = extract_json(response).ok()?;
    serde_json::from_str(&json).ok()
}

/// Read a shot blueprint, defaulting every missing field.
///
/// Keys are accepted as `SHOT_TYPE`, `shotType` or `shot_type` (likewise for
/// the rest). Labels are normalised onto the known framings and views.
///
/// # Examples
///
/// ```
/// use cineforge_core::{CameraView, ShotType};
/// use cineforge_narrative::parse_shot_blueprint;
///
/// let shot = parse_shot_blueprint(r#"{"SHOT_TYPE": "Extreme wide", "VIEW": "over the shoulder"}"#);
/// assert_eq!(shot.shot_type, ShotType::Wide);
/// assert_eq!(shot.view, CameraView::Ots);
/// assert_eq!(shot.angle, "Eye level");
/// ```
pub fn parse_shot_blueprint(response: &str) -> ShotBlueprint {
    let Some(value) = parsed_json(response).filter(JsonValue::is_object) else {
        tracing::warn!("Shot response held no JSON object, using defaults");
        return ShotBlueprint::default();
    };
    let defaults = ShotBlueprint::default();
    ShotBlueprint {
        shot_type: text_field(&value, &["SHOT_TYPE", "shotType", "shot_type"])
            .map(ShotType::normalize)
            .unwrap_or(defaults.shot_type),
        angle: text_or(&value, &["ANGLE", "angle"], &defaults.angle),
        view: text_field(&value, &["VIEW", "view"])
            .map(CameraView::normalize)
            .unwrap_or(defaults.view),
        staging: text_or(&value, &["STAGING", "staging"], &defaults.staging),
        relational_staging: text_field(
            &value,
            &["RELATIONAL_STAGING", "relationalStaging", "relational_staging"],
        )
        .map(str::to_string),
        scene_function: text_or(
            &value,
            &["SCENE_FUNCTION", "sceneFunction", "scene_function"],
            &defaults.scene_function,
        ),
    }
}

/// Read a background blueprint, defaulting every missing field.
///
/// A response with no JSON object at all yields [`BackgroundBlueprint::fallback`].
pub fn parse_background_blueprint(response: &str) -> BackgroundBlueprint {
    let Some(value) = parsed_json(response).filter(JsonValue::is_object) else {
        tracing::warn!("Background response held no JSON object, using fallback");
        return BackgroundBlueprint::fallback();
    };
    let defaults = BackgroundBlueprint::default();
    BackgroundBlueprint {
        master_location: text_or(
            &value,
            &["MASTER_LOCATION", "masterLocation", "master_location"],
            &defaults.master_location,
        ),
        overlay_elements: string_list(
            &value,
            &["OVERLAY_ELEMENTS", "overlayElements", "overlay_elements"],
        )
        .filter(|items| !items.is_empty())
        .unwrap_or(defaults.overlay_elements),
        lighting: text_or(&value, &["LIGHTING", "lighting"], &defaults.lighting),
        atmospheric_details: text_or(
            &value,
            &[
                "ATMOSPHERIC_DETAILS",
                "atmosphericDetails",
                "atmospheric_details",
            ],
            &defaults.atmospheric_details,
        ),
    }
}

fn snippet_set(value: Option<&JsonValue>, defaults: SnippetSet) -> SnippetSet {
    let Some(value) = value else {
        return defaults;
    };
    SnippetSet {
        front: text_or(value, &["front"], &defaults.front),
        side: text_or(value, &["side"], &defaults.side),
        back: text_or(value, &["back"], &defaults.back),
    }
}

fn profile_from(value: &JsonValue, roster_name: Option<&str>) -> CharacterProfile {
    let empty = JsonValue::Null;
    let appearance = value.get("appearance").unwrap_or(&empty);
    let outfit = value.get("outfit").unwrap_or(&empty);
    let snippets = value.get("snippets").unwrap_or(&empty);
    let appearance_defaults = Appearance::default();
    let outfit_defaults = Outfit::default();
    let snippet_defaults = ShotSnippets::default();

    CharacterProfile {
        name: text_field(value, &["name"])
            .or(roster_name)
            .unwrap_or_default()
            .to_string(),
        appearance: Appearance {
            eyes: text_or(appearance, &["eyes"], &appearance_defaults.eyes),
            skin: text_or(appearance, &["skin"], &appearance_defaults.skin),
            hair: text_or(appearance, &["hair"], &appearance_defaults.hair),
        },
        outfit: Outfit {
            upper: text_or(outfit, &["upper"], &outfit_defaults.upper),
            lower: text_or(outfit, &["lower"], &outfit_defaults.lower),
            footwear: text_or(outfit, &["footwear"], &outfit_defaults.footwear),
        },
        props: string_list(value, &["props"]).unwrap_or_default(),
        snippets: ShotSnippets {
            closeup: snippet_set(
                snippets.get("closeup").or_else(|| snippets.get("closeUp")),
                snippet_defaults.closeup,
            ),
            medium: snippet_set(snippets.get("medium"), snippet_defaults.medium),
            wide: snippet_set(snippets.get("wide"), snippet_defaults.wide),
        },
    }
}

/// Read character profiles, defaulting every missing field.
///
/// Accepts a JSON array, an object with a `characters` array, or a single
/// object. Profiles without a name take the roster name at the same
/// position. When nothing usable comes back, every roster character gets a
/// [`CharacterProfile::placeholder`].
///
/// # Examples
///
/// ```
/// use cineforge_narrative::parse_character_profiles;
///
/// let roster = vec!["Ava".to_string(), "Leo".to_string()];
/// let profiles = parse_character_profiles("I could not do that.", &roster);
/// assert_eq!(profiles.len(), 2);
/// assert_eq!(profiles[1].snippets.wide.back, "Leo wide shot, back view");
///
/// let profiles = parse_character_profiles(
///     r#"{"characters": [{"name": "Ava", "outfit": {"upper": "Navy wool peacoat"}}]}"#,
///     &roster,
/// );
/// assert_eq!(profiles[0].outfit.upper, "Navy wool peacoat");
/// assert_eq!(profiles[0].outfit.lower, "Not specified");
/// ```
pub fn parse_character_profiles(response: &str, roster: &[String]) -> Vec<CharacterProfile> {
    let items = match parsed_json(response) {
        Some(JsonValue::Array(items)) => items,
        Some(value @ JsonValue::Object(_)) => match value.get("characters") {
            Some(JsonValue::Array(items)) => items.clone(),
            _ => vec![value],
        },
        _ => Vec::new(),
    };

    let profiles: Vec<CharacterProfile> = items
        .iter()
        .filter(|item| item.is_object())
        .enumerate()
        .map(|(i, item)| profile_from(item, roster.get(i).map(String::as_str)))
        .filter(|profile| !profile.name.is_empty())
        .collect();

    if profiles.is_empty() {
        tracing::warn!(
            roster = roster.len(),
            "Character response unusable, using placeholder profiles"
        );
        return roster
            .iter()
            .map(|name| CharacterProfile::placeholder(name))
            .collect();
    }
    profiles
}

/// Result of designing a project's production blueprints.
#[derive(Debug, Clone)]
pub struct ProductionPlan {
    /// Character profiles as stored
    pub characters: Vec<CharacterProfile>,
    /// Scene blueprints written in this run
    pub scenes: Vec<SceneRecord>,
    /// Locked scenes left untouched
    pub skipped_locked: Vec<usize>,
}

/// Designs and stores shot, background and character blueprints.
#[derive(Debug, Clone)]
pub struct ProductionDesigner {
    repository: ProjectRepository,
    settings: StageSettings,
}

impl ProductionDesigner {
    /// Designer over the given repository.
    pub fn new(repository: ProjectRepository, settings: StageSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    async fn call(
        &self,
        adapter: &dyn GenerationAdapter,
        prompt: CompiledPrompt,
        settings: &GenerationSettings,
    ) -> CineforgeResult<String> {
        generate_text(
            adapter,
            &prompt.to_params(settings),
            *self.settings.call_timeout_secs(),
        )
        .await
    }

    /// Character profiles for a story.
    pub async fn design_characters(
        &self,
        adapter: &dyn GenerationAdapter,
        story_text: &str,
        roster: &[String],
        custom_prompt: Option<&str>,
    ) -> CineforgeResult<Vec<CharacterProfile>> {
        let prompt = compile_character_profiles(story_text, roster, custom_prompt);
        let response = self.call(adapter, prompt, self.settings.character()).await?;
        Ok(parse_character_profiles(&response, roster))
    }

    /// Shot blueprint for one scene.
    pub async fn design_shot(
        &self,
        adapter: &dyn GenerationAdapter,
        scene_text: &str,
        scene_index: usize,
        characters: &[String],
    ) -> CineforgeResult<ShotBlueprint> {
        let prompt = compile_shot_blueprint(scene_text, scene_index, characters);
        let response = self.call(adapter, prompt, self.settings.shot()).await?;
        Ok(parse_shot_blueprint(&response))
    }

    /// Background blueprint for one scene.
    pub async fn design_background(
        &self,
        adapter: &dyn GenerationAdapter,
        scene_text: &str,
    ) -> CineforgeResult<BackgroundBlueprint> {
        let prompt = compile_background_blueprint(scene_text);
        let response = self.call(adapter, prompt, self.settings.background()).await?;
        Ok(parse_background_blueprint(&response))
    }

    /// Designs every production blueprint of a project.
    ///
    /// Characters come first, then a shot and a background per scene, in
    /// scene order. Locked scenes keep their stored blueprints. The project
    /// moves to `stage3_complete`.
    ///
    /// # Errors
    ///
    /// [`NarrativeErrorKind::MissingStory`] when no story is stored, provider
    /// errors from any call, and store failures.
    #[tracing::instrument(skip(self, adapter, custom_prompt), fields(provider = adapter.provider_name()))]
    pub async fn design_project(
        &self,
        project_id: &str,
        adapter: &dyn GenerationAdapter,
        custom_prompt: Option<&str>,
    ) -> CineforgeResult<ProductionPlan> {
        require_project_id(project_id)?;
        let story = self.repository.require_story(project_id).await?;
        let roster = self
            .repository
            .blueprint(project_id)
            .await?
            .map(|blueprint| blueprint.characters().clone())
            .unwrap_or_default();

        let characters = self
            .design_characters(adapter, &story.story.story_text, &roster, custom_prompt)
            .await?;
        let names: Vec<String> = characters.iter().map(|c| c.name.clone()).collect();

        let locked: HashSet<usize> = self
            .repository
            .scenes(project_id)
            .await?
            .into_iter()
            .filter(|scene| scene.is_locked)
            .map(|scene| scene.scene_index)
            .collect();

        let mut scenes = Vec::new();
        let mut skipped_locked = Vec::new();
        for (scene_index, scene_text) in story.story.scenes.iter().enumerate() {
            if locked.contains(&scene_index) {
                tracing::debug!(scene_index, "Scene locked, keeping stored blueprints");
                skipped_locked.push(scene_index);
                continue;
            }
            let shot = self
                .design_shot(adapter, scene_text, scene_index, &names)
                .await?;
            let background = self.design_background(adapter, scene_text).await?;
            let record = SceneRecord {
                project_id: project_id.to_string(),
                scene_index,
                scene_text: scene_text.clone(),
                shot,
                background,
                is_locked: false,
                updated_at: Utc::now(),
            };
            self.repository.save_scene(&record).await?;
            scenes.push(record);
        }

        for profile in &characters {
            self.repository
                .save_character(&CharacterRecord {
                    project_id: project_id.to_string(),
                    profile: profile.clone(),
                    updated_at: Utc::now(),
                })
                .await?;
        }

        self.repository
            .advance_status(project_id, ProjectStatus::Stage3Complete)
            .await;
        tracing::info!(
            characters = characters.len(),
            scenes = scenes.len(),
            locked = skipped_locked.len(),
            "Production blueprints designed"
        );
        Ok(ProductionPlan {
            characters,
            scenes,
            skipped_locked,
        })
    }

    /// Redesigns the shot of one stored scene.
    ///
    /// # Errors
    ///
    /// Not-found input error when the scene has no blueprint yet,
    /// [`NarrativeErrorKind::SceneLocked`] for a locked scene, and provider
    /// errors.
    #[tracing::instrument(skip(self, adapter))]
    pub async fn regenerate_shot(
        &self,
        project_id: &str,
        scene_index: usize,
        adapter: &dyn GenerationAdapter,
    ) -> CineforgeResult<ShotBlueprint> {
        require_project_id(project_id)?;
        let scene = self
            .repository
            .scene(project_id, scene_index)
            .await?
            .ok_or_else(|| {
                InputError::new(InputErrorKind::NotFound {
                    entity: "scene".to_string(),
                    key: format!("{}#{}", project_id, scene_index),
                })
            })?;
        if scene.is_locked {
            return Err(NarrativeError::new(NarrativeErrorKind::SceneLocked(scene_index)).into());
        }

        let names: Vec<String> = self
            .repository
            .characters(project_id)
            .await?
            .into_iter()
            .map(|c| c.profile.name)
            .collect();
        let shot = self
            .design_shot(adapter, &scene.scene_text, scene_index, &names)
            .await?;
        self.repository
            .update_scene_shot(project_id, scene_index, &shot)
            .await?;
        Ok(shot)
    }

    /// Locks a scene against regeneration.
    pub async fn lock_scene(&self, project_id: &str, scene_index: usize) -> CineforgeResult<SceneRecord> {
        require_project_id(project_id)?;
        self.repository
            .set_scene_lock(project_id, scene_index, true)
            .await
    }

    /// Unlocks a scene.
    pub async fn unlock_scene(
        &self,
        project_id: &str,
        scene_index: usize,
    ) -> CineforgeResult<SceneRecord> {
        require_project_id(project_id)?;
        self.repository
            .set_scene_lock(project_id, scene_index, false)
            .await
    }
}
