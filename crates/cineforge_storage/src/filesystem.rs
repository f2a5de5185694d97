//! Filesystem-based record store.
//!
//! Each record is one JSON document stored under
//! `{base_path}/{kind}/{hash[0:2]}/{hash}.json`, where `hash` is the SHA-256
//! of the record key. The document wraps the data together with its key so
//! prefix scans can recover keys without reversing the hash.

use crate::merge::{merge_fields, require_object};
use async_trait::async_trait;
use cineforge_error::{CineforgeResult, StorageError, StorageErrorKind};
use cineforge_interface::{EntityKind, RecordKey, RecordStore};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    key: RecordKey,
    data: JsonValue,
}

/// Filesystem record store.
///
/// # Features
///
/// - **Atomic writes**: temp file + rename, so readers never see a partial record
/// - **Serialized writers**: read-modify-write of `update` runs under one lock
/// - **Flat fan-out**: one level of hash-prefix directories per kind
pub struct FileSystemRecordStore {
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSystemRecordStore {
    /// Create a new filesystem record store.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> CineforgeResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem record store");
        Ok(Self {
            base_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn compute_hash(key: &RecordKey) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn kind_dir(&self, kind: EntityKind) -> PathBuf {
        self.base_path.join(kind.to_string())
    }

    /// Structure: `{base}/{kind}/{hash[0:2]}/{hash}.json`
    fn record_path(&self, kind: EntityKind, key: &RecordKey) -> PathBuf {
        let hash = Self::compute_hash(key);
        self.kind_dir(kind)
            .join(&hash[0..2])
            .join(format!("{}.json", hash))
    }

    async fn read_record(path: &Path) -> CineforgeResult<Option<StoredRecord>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(Some(record))
    }

    async fn write_record(&self, path: &Path, record: &StoredRecord) -> CineforgeResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let bytes = serde_json::to_vec_pretty(record).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(e.to_string()))
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&temp_path, &bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        Ok(())
    }

    async fn record_files(&self, kind: EntityKind) -> CineforgeResult<Vec<PathBuf>> {
        let kind_dir = self.kind_dir(kind);
        let mut files = Vec::new();
        let mut shards = match tokio::fs::read_dir(&kind_dir).await {
            Ok(shards) => shards,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    kind_dir.display(),
                    e
                )))
                .into());
            }
        };
        let read_err = |path: &Path, e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
        };
        while let Some(shard) = shards
            .next_entry()
            .await
            .map_err(|e| read_err(&kind_dir, e))?
        {
            let shard_path = shard.path();
            if !shard_path.is_dir() {
                continue;
            }
            let mut entries = tokio::fs::read_dir(&shard_path)
                .await
                .map_err(|e| read_err(&shard_path, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| read_err(&shard_path, e))?
            {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl RecordStore for FileSystemRecordStore {
    #[tracing::instrument(skip(self, data), fields(kind = %kind, key = %key))]
    async fn upsert(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        data: JsonValue,
    ) -> CineforgeResult<JsonValue> {
        require_object(&data)?;
        let path = self.record_path(kind, key);
        let record = StoredRecord {
            key: key.clone(),
            data,
        };

        let _guard = self.write_lock.lock().await;
        self.write_record(&path, &record).await?;
        tracing::debug!(path = %path.display(), "Upserted record");
        Ok(record.data)
    }

    async fn find_unique(
        &self,
        kind: EntityKind,
        key: &RecordKey,
    ) -> CineforgeResult<Option<JsonValue>> {
        let path = self.record_path(kind, key);
        Ok(Self::read_record(&path).await?.map(|record| record.data))
    }

    #[tracing::instrument(skip(self, data), fields(kind = %kind, key = %key))]
    async fn update(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        data: JsonValue,
    ) -> CineforgeResult<JsonValue> {
        let path = self.record_path(kind, key);

        let _guard = self.write_lock.lock().await;
        let Some(mut record) = Self::read_record(&path).await? else {
            return Err(
                StorageError::new(StorageErrorKind::NotFound(format!("{}/{}", kind, key))).into(),
            );
        };
        merge_fields(&mut record.data, data)?;
        self.write_record(&path, &record).await?;
        tracing::debug!(path = %path.display(), "Updated record");
        Ok(record.data)
    }

    async fn delete(&self, kind: EntityKind, key: &RecordKey) -> CineforgeResult<bool> {
        let path = self.record_path(kind, key);
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted record");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    async fn find_many(
        &self,
        kind: EntityKind,
        prefix: &str,
    ) -> CineforgeResult<Vec<(RecordKey, JsonValue)>> {
        let mut found = Vec::new();
        for path in self.record_files(kind).await? {
            if let Some(record) = Self::read_record(&path).await?
                && record.key.as_str().starts_with(prefix)
            {
                found.push((record.key, record.data));
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }
}
