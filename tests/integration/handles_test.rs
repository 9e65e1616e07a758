//! Handle cache integration tests: mint, share, release, refresh, and the
//! missing-artifact degradation.

mod common;

use uuid::Uuid;

use easel_images::{HandleCache, Resolution};

use common::{memory_repo, seed};

fn live(resolution: Resolution) -> easel_images::DisplayHandle {
    match resolution {
        Resolution::Live(handle) => handle,
        Resolution::Missing => panic!("expected a live handle"),
    }
}

#[tokio::test]
async fn acquire_serves_store_bytes_through_a_session_file() {
    let repo = memory_repo().await;
    let artifact = seed(&repo, "prompt").await;
    let stored = repo.get(artifact.id).await.unwrap().unwrap();

    let cache = HandleCache::new(repo).unwrap();
    let handle = live(cache.acquire(artifact.id).await);

    assert_eq!(handle.artifact_id, artifact.id);
    let bytes = tokio::fs::read(&handle.path).await.unwrap();
    assert_eq!(bytes, stored.payload.bytes);
}

#[tokio::test]
async fn handles_are_shared_within_a_session() {
    let repo = memory_repo().await;
    let artifact = seed(&repo, "prompt").await;

    let cache = HandleCache::new(repo).unwrap();
    let first = live(cache.acquire(artifact.id).await);
    let second = live(cache.acquire(artifact.id).await);

    assert_eq!(first, second);
    assert_eq!(cache.live_count(), 1);
}

#[tokio::test]
async fn separate_sessions_mint_separate_handles() {
    let repo = memory_repo().await;
    let artifact = seed(&repo, "prompt").await;

    // Two caches model two sessions; handles are never persisted, each
    // session re-derives from the store
    let session_a = HandleCache::new(repo.clone()).unwrap();
    let session_b = HandleCache::new(repo).unwrap();

    let a = live(session_a.acquire(artifact.id).await);
    let b = live(session_b.acquire(artifact.id).await);
    assert_ne!(a.path, b.path);
}

#[tokio::test]
async fn release_then_acquire_remints() {
    let repo = memory_repo().await;
    let artifact = seed(&repo, "prompt").await;

    let cache = HandleCache::new(repo).unwrap();
    let first = live(cache.acquire(artifact.id).await);

    cache.release(artifact.id).await;
    assert!(!first.path.exists());

    let second = live(cache.acquire(artifact.id).await);
    assert_ne!(first.path, second.path);
    assert!(second.path.exists());
}

#[tokio::test]
async fn unknown_artifact_resolves_missing() {
    let repo = memory_repo().await;
    let cache = HandleCache::new(repo).unwrap();

    assert_eq!(cache.acquire(Uuid::new_v4()).await, Resolution::Missing);
    // Releasing an id with no live handle is safe
    cache.release(Uuid::new_v4()).await;
}

#[tokio::test]
async fn force_refresh_survives_missing_and_remints_fresh_paths() {
    let repo = memory_repo().await;
    let artifact = seed(&repo, "prompt").await;

    let cache = HandleCache::new(repo.clone()).unwrap();
    let first = live(cache.acquire(artifact.id).await);
    let refreshed = live(cache.force_refresh(artifact.id).await);
    assert_ne!(first.path, refreshed.path);

    // Once the record is gone, refresh degrades to missing
    repo.delete(artifact.id).await.unwrap();
    assert_eq!(cache.force_refresh(artifact.id).await, Resolution::Missing);
    assert_eq!(cache.live_count(), 0);
}
