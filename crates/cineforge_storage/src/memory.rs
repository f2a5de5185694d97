//! In-memory record store.

use crate::merge::{merge_fields, require_object};
use async_trait::async_trait;
use cineforge_error::{CineforgeResult, StorageError, StorageErrorKind};
use cineforge_interface::{EntityKind, RecordKey, RecordStore};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local record store.
///
/// Each write holds the lock for its whole read-modify-write, so a single
/// `update` is atomic with respect to concurrent readers.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<EntityKind, BTreeMap<RecordKey, JsonValue>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all kinds.
    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(BTreeMap::len).sum()
    }

    /// True when no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    #[tracing::instrument(skip(self, data), fields(kind = %kind, key = %key))]
    async fn upsert(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        data: JsonValue,
    ) -> CineforgeResult<JsonValue> {
        require_object(&data)?;
        let mut records = self.records.write().await;
        records.entry(kind).or_default().insert(key.clone(), data.clone());
        tracing::debug!("Upserted record");
        Ok(data)
    }

    async fn find_unique(
        &self,
        kind: EntityKind,
        key: &RecordKey,
    ) -> CineforgeResult<Option<JsonValue>> {
        let records = self.records.read().await;
        Ok(records.get(&kind).and_then(|by_key| by_key.get(key)).cloned())
    }

    #[tracing::instrument(skip(self, data), fields(kind = %kind, key = %key))]
    async fn update(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        data: JsonValue,
    ) -> CineforgeResult<JsonValue> {
        let mut records = self.records.write().await;
        let Some(existing) = records.get_mut(&kind).and_then(|by_key| by_key.get_mut(key)) else {
            return Err(
                StorageError::new(StorageErrorKind::NotFound(format!("{}/{}", kind, key))).into(),
            );
        };
        let mut merged = existing.clone();
        merge_fields(&mut merged, data)?;
        *existing = merged.clone();
        tracing::debug!("Updated record");
        Ok(merged)
    }

    async fn delete(&self, kind: EntityKind, key: &RecordKey) -> CineforgeResult<bool> {
        let mut records = self.records.write().await;
        Ok(records
            .get_mut(&kind)
            .and_then(|by_key| by_key.remove(key))
            .is_some())
    }

    async fn find_many(
        &self,
        kind: EntityKind,
        prefix: &str,
    ) -> CineforgeResult<Vec<(RecordKey, JsonValue)>> {
        let records = self.records.read().await;
        Ok(records
            .get(&kind)
            .map(|by_key| {
                by_key
                    .iter()
                    .filter(|(key, _)| key.as_str().starts_with(prefix))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
