//! Health monitor integration tests: classification and destructive rebuild.

mod common;

use easel_images::{HandleCache, HealthMonitor, Resolution, StoreHealth};

use common::{memory_repo, seed};

#[tokio::test]
async fn empty_store_is_empty() {
    let monitor = HealthMonitor::new(memory_repo().await);
    assert_eq!(monitor.check().await.unwrap(), StoreHealth::Empty);
}

#[tokio::test]
async fn fully_readable_store_is_healthy() {
    let repo = memory_repo().await;
    seed(&repo, "one").await;
    seed(&repo, "two").await;
    seed(&repo, "three").await;

    let monitor = HealthMonitor::new(repo);
    match monitor.check().await.unwrap() {
        StoreHealth::Healthy {
            records,
            total_bytes,
        } => {
            assert_eq!(records, 3);
            assert_eq!(total_bytes, 3 * 128);
        }
        other => panic!("expected healthy, got {:?}", other),
    }
}

#[tokio::test]
async fn one_unreconstructible_record_marks_the_store_corrupt() {
    let repo = memory_repo().await;
    seed(&repo, "fine").await;
    let bad = seed(&repo, "bad").await;

    // Corrupt the stored frame out-of-band
    sqlx::query("UPDATE images SET payload = ? WHERE id = ?")
        .bind(vec![0x00u8])
        .bind(bad.id)
        .execute(repo.pool())
        .await
        .unwrap();

    let monitor = HealthMonitor::new(repo.clone());
    match monitor.check().await.unwrap() {
        StoreHealth::Corrupt {
            records,
            corrupt_ids,
        } => {
            assert_eq!(records, 2);
            assert_eq!(corrupt_ids, vec![bad.id]);
        }
        other => panic!("expected corrupt, got {:?}", other),
    }

    // The check mutated nothing
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn rebuild_recovers_to_a_clean_empty_store() {
    let repo = memory_repo().await;
    let kept_reference = seed(&repo, "one").await;
    seed(&repo, "two").await;

    let cache = HandleCache::new(repo.clone()).unwrap();
    assert!(matches!(
        cache.acquire(kept_reference.id).await,
        Resolution::Live(_)
    ));

    let monitor = HealthMonitor::new(repo.clone());
    assert_eq!(monitor.rebuild().await.unwrap(), 2);
    assert_eq!(monitor.check().await.unwrap(), StoreHealth::Empty);

    // External references to deleted records resolve as missing, not fatal
    cache.release_all().await;
    assert_eq!(cache.acquire(kept_reference.id).await, Resolution::Missing);
}
