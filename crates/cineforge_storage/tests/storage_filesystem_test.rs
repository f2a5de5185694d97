use cineforge_error::CineforgeErrorKind;
use cineforge_interface::{EntityKind, RecordKey, RecordStore};
use cineforge_storage::FileSystemRecordStore;
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_upsert_and_find() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;
    let key = RecordKey::project("p1");

    store
        .upsert(EntityKind::Story, &key, json!({"title": "Tides"}))
        .await?;
    let found = store.find_unique(EntityKind::Story, &key).await?;
    assert_eq!(found, Some(json!({"title": "Tides"})));

    // Other kinds are separate namespaces
    assert_eq!(store.find_unique(EntityKind::Blueprint, &key).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_upsert_replaces() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;
    let key = RecordKey::project("p1");

    store
        .upsert(EntityKind::Project, &key, json!({"status": "draft", "extra": 1}))
        .await?;
    store
        .upsert(EntityKind::Project, &key, json!({"status": "stage1_complete"}))
        .await?;

    let found = store.find_unique(EntityKind::Project, &key).await?;
    assert_eq!(found, Some(json!({"status": "stage1_complete"})));
    Ok(())
}

#[tokio::test]
async fn test_update_merges_top_level_fields() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;
    let key = RecordKey::project("p1");

    store
        .upsert(
            EntityKind::Story,
            &key,
            json!({"title": "Tides", "scenes": ["a"], "isValidated": false}),
        )
        .await?;
    let merged = store
        .update(EntityKind::Story, &key, json!({"scenes": ["b"], "isValidated": true}))
        .await?;

    assert_eq!(
        merged,
        json!({"title": "Tides", "scenes": ["b"], "isValidated": true})
    );
    assert_eq!(store.find_unique(EntityKind::Story, &key).await?, Some(merged));
    Ok(())
}

#[tokio::test]
async fn test_update_missing_record_fails() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;

    let err = store
        .update(EntityKind::Story, &RecordKey::project("nope"), json!({"a": 1}))
        .await
        .expect_err("record does not exist");
    assert!(matches!(err.kind(), CineforgeErrorKind::Storage(_)));
    assert_eq!(err.http_status(), 404);
    Ok(())
}

#[tokio::test]
async fn test_find_many_by_project_prefix() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;

    for index in [2, 0, 1] {
        store
            .upsert(
                EntityKind::Scene,
                &RecordKey::scene("p1", index),
                json!({"sceneIndex": index}),
            )
            .await?;
    }
    store
        .upsert(EntityKind::Scene, &RecordKey::scene("p2", 0), json!({"sceneIndex": 0}))
        .await?;

    let scenes = store
        .find_many(EntityKind::Scene, &RecordKey::project_prefix("p1"))
        .await?;
    let indexes: Vec<_> = scenes.iter().map(|(_, v)| v["sceneIndex"].clone()).collect();
    assert_eq!(indexes, vec![json!(0), json!(1), json!(2)]);
    Ok(())
}

#[tokio::test]
async fn test_delete() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;
    let key = RecordKey::character("p1", "Ava");

    store
        .upsert(EntityKind::Character, &key, json!({"name": "Ava"}))
        .await?;
    assert!(store.delete(EntityKind::Character, &key).await?);
    assert!(!store.delete(EntityKind::Character, &key).await?);
    assert_eq!(store.find_unique(EntityKind::Character, &key).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_records_survive_reopen() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let key = RecordKey::project("p1");
    {
        let store = FileSystemRecordStore::new(temp_dir.path())?;
        store
            .upsert(EntityKind::Blueprint, &key, json!({"genre": "Drama"}))
            .await?;
    }
    let reopened = FileSystemRecordStore::new(temp_dir.path())?;
    assert_eq!(
        reopened.find_unique(EntityKind::Blueprint, &key).await?,
        Some(json!({"genre": "Drama"}))
    );
    Ok(())
}

#[tokio::test]
async fn test_rejects_non_object_data() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemRecordStore::new(temp_dir.path())?;
    let result = store
        .upsert(EntityKind::Story, &RecordKey::project("p1"), json!(["not", "an", "object"]))
        .await;
    assert!(result.is_err());
    Ok(())
}
