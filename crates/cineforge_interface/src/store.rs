//! Keyed record store consumed by the pipeline.

use async_trait::async_trait;
use cineforge_error::CineforgeResult;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Kinds of records the pipeline persists.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    /// Project header
    Project,
    /// Blueprint, one per project
    Blueprint,
    /// Story, one per project
    Story,
    /// Scene production blueprint, keyed by project and index
    Scene,
    /// Character profile, keyed by project and name
    Character,
}

/// Unique key of a record within its entity kind.
///
/// Composite keys join their parts with `/`, so every record owned by a
/// project shares the [`RecordKey::project_prefix`].
///
/// # Examples
///
/// ```
/// use cineforge_interface::RecordKey;
///
/// assert_eq!(RecordKey::scene("p1", 3).as_str(), "p1/0003");
/// assert!(RecordKey::character("p1", "Ava").as_str().starts_with(&RecordKey::project_prefix("p1")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey(String);

impl RecordKey {
    /// Key of a per-project singleton record (project, blueprint, story).
    pub fn project(project_id: &str) -> Self {
        Self(project_id.to_string())
    }

    /// Key of a scene record. Zero-padded so keys sort by index.
    pub fn scene(project_id: &str, scene_index: usize) -> Self {
        Self(format!("{}/{:04}", project_id, scene_index))
    }

    /// Key of a character record.
    pub fn character(project_id: &str, name: &str) -> Self {
        Self(format!("{}/{}", project_id, name))
    }

    /// Prefix shared by every composite key owned by a project.
    pub fn project_prefix(project_id: &str) -> String {
        format!("{}/", project_id)
    }

    /// Raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyed record store with create-or-update semantics.
///
/// Records are JSON objects. A single `upsert` or `update` call is the unit
/// of atomicity: either the whole record is written or nothing is.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the record, or replace it if it exists. Returns the stored record.
    async fn upsert(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        data: JsonValue,
    ) -> CineforgeResult<JsonValue>;

    /// Fetch one record.
    async fn find_unique(&self, kind: EntityKind, key: &RecordKey)
    -> CineforgeResult<Option<JsonValue>>;

    /// Shallow-merge the top-level fields of `data` into an existing record.
    ///
    /// # Errors
    ///
    /// Returns a not-found storage error when the record does not exist.
    async fn update(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        data: JsonValue,
    ) -> CineforgeResult<JsonValue>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, kind: EntityKind, key: &RecordKey) -> CineforgeResult<bool>;

    /// All records whose key starts with `prefix`, ordered by key.
    async fn find_many(
        &self,
        kind: EntityKind,
        prefix: &str,
    ) -> CineforgeResult<Vec<(RecordKey, JsonValue)>>;
}
