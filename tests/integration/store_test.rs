//! Artifact store integration tests: round-trips, ordering, idempotent
//! deletion, and the schema versioning contract.

mod common;

use std::str::FromStr;

use chrono::{Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use easel_common::{payload_checksum, Error};
use easel_images::{ImageArtifact, ImageRepository, Payload, StoreHealth, SCHEMA_VERSION};

use common::{memory_repo, payload, seed};

#[tokio::test]
async fn round_trip_preserves_bytes_and_metadata() {
    let repo = memory_repo().await;

    let p = Payload::new("image/jpeg", (0u8..=255).cycle().take(4096).collect());
    let artifact = ImageArtifact::new("a misty forest", "a misty pine forest", "gemini", &p)
        .expect("artifact is valid");

    repo.put(&artifact, &p).await.expect("put succeeds");

    let stored = repo
        .get(artifact.id)
        .await
        .expect("get succeeds")
        .expect("record exists");

    assert_eq!(stored.payload.bytes, p.bytes);
    assert_eq!(stored.payload.content_type, "image/jpeg");
    assert_eq!(stored.artifact, artifact);
}

#[tokio::test]
async fn get_all_is_newest_first_regardless_of_insertion_order() {
    let repo = memory_repo().await;
    let p = payload(64);

    let base = Utc::now();
    let mut records = Vec::new();
    for (i, prompt) in ["t1", "t2", "t3"].iter().enumerate() {
        let mut artifact =
            ImageArtifact::new(prompt, prompt, "mock", &p).expect("artifact is valid");
        artifact.created_at = base - Duration::seconds(60 - i as i64 * 10);
        records.push(artifact);
    }

    // Insert t2, t3, t1
    repo.put(&records[1], &p).await.unwrap();
    repo.put(&records[2], &p).await.unwrap();
    repo.put(&records[0], &p).await.unwrap();

    let prompts: Vec<String> = repo
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.artifact.original_prompt)
        .collect();
    assert_eq!(prompts, vec!["t3", "t2", "t1"]);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let repo = memory_repo().await;
    let artifact = seed(&repo, "to delete").await;

    assert!(repo.delete(artifact.id).await.unwrap());
    let after_first = repo.count().await.unwrap();

    // Second delete of the same id is a no-op with identical store state
    assert!(!repo.delete(artifact.id).await.unwrap());
    assert_eq!(repo.count().await.unwrap(), after_first);
    assert!(repo.get(artifact.id).await.unwrap().is_none());

    // Deleting an id that never existed is also a no-op
    assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn quota_rejection_leaves_no_partial_record() {
    let repo = ImageRepository::open_in_memory(1_000).await.unwrap();

    let p = payload(2_000);
    let artifact = ImageArtifact::new("too big", "too big", "mock", &p).unwrap();

    let err = repo.put(&artifact, &p).await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded(_)));
    assert_eq!(repo.count().await.unwrap(), 0);
    assert!(repo.get(artifact.id).await.unwrap().is_none());
}

/// Build a v1-era database file: raw unframed payload bytes, no source or
/// checksum columns, schema_version = 1.
async fn create_v1_store(path: &std::path::Path, records: &[(Uuid, &str, Vec<u8>)]) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query("CREATE TABLE schema_version (version INTEGER PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO schema_version (version) VALUES (1)")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE images (
            id TEXT PRIMARY KEY,
            original_prompt TEXT NOT NULL,
            refined_prompt TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            payload BLOB NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    for (id, prompt, bytes) in records {
        sqlx::query(
            "INSERT INTO images (id, original_prompt, refined_prompt, content_type, \
             size_bytes, payload, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(*id)
        .bind(*prompt)
        .bind(*prompt)
        .bind("image/png")
        .bind(bytes.len() as i64)
        .bind(bytes.as_slice())
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
    }

    pool.close().await;
}

#[tokio::test]
async fn v1_store_upgrades_non_destructively() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let id = Uuid::new_v4();
    let bytes = vec![0x89u8, 0x50, 0x4E, 0x47, 1, 2, 3, 4, 5, 6];
    create_v1_store(&path, &[(id, "legacy prompt", bytes.clone())]).await;

    // Opening the old store migrates it in place
    let repo = ImageRepository::open(&path, common::TEST_STORE_BYTES)
        .await
        .expect("v1 store opens and migrates");

    let stored = repo
        .get(id)
        .await
        .expect("migrated record reads")
        .expect("migrated record exists");

    assert_eq!(stored.payload.bytes, bytes);
    assert_eq!(stored.payload.content_type, "image/png");
    assert_eq!(stored.artifact.original_prompt, "legacy prompt");
    assert_eq!(stored.artifact.source, "unknown");
    assert_eq!(stored.artifact.checksum, payload_checksum(&bytes));

    // The migrated store is healthy, not merely readable
    let monitor = easel_images::HealthMonitor::new(repo.clone());
    assert!(matches!(
        monitor.check().await.unwrap(),
        StoreHealth::Healthy { records: 1, .. }
    ));

    // And a reopen sees the current version with no further migration
    drop(repo);
    let reopened = ImageRepository::open(&path, common::TEST_STORE_BYTES)
        .await
        .unwrap();
    let version: i64 = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_one(reopened.pool())
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn future_schema_version_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::query("CREATE TABLE schema_version (version INTEGER PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO schema_version (version) VALUES (99)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let err = ImageRepository::open(&path, common::TEST_STORE_BYTES)
        .await
        .expect_err("future schema must not open");
    assert!(matches!(err, Error::StorageUnavailable(_)));
}
