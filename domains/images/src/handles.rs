//! Session-scoped display handle cache
//!
//! Bridges durable bytes to something a rendering surface can use directly:
//! a live file under a session directory. Handles are a finite, revocable
//! resource owned entirely by this cache; they are minted lazily, shared by
//! every consumer of the same artifact within the session, and die with the
//! session directory. The store remains the only durable source of truth;
//! a handle is never persisted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    RwLock,
};

use tempfile::TempDir;
use uuid::Uuid;

use easel_common::{Error, Result};

use crate::repository::ImageRepository;

/// A live, revocable reference to an artifact's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHandle {
    /// Back-reference to the owning record (lookup only, not ownership)
    pub artifact_id: Uuid,
    /// File under the session directory, loadable by a rendering surface
    pub path: PathBuf,
    pub content_type: String,
}

/// Outcome of resolving an artifact for display.
///
/// `Missing` is a normal, expected state (the store may have been rebuilt
/// underneath a stale reference); callers render it with a retry affordance
/// rather than treating it as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Live(DisplayHandle),
    Missing,
}

/// Per-session arena of display handles keyed by artifact id
pub struct HandleCache {
    repo: ImageRepository,
    session_dir: TempDir,
    live: RwLock<HashMap<Uuid, DisplayHandle>>,
    generation: AtomicU64,
}

impl HandleCache {
    /// Create the cache with a fresh session directory.
    pub fn new(repo: ImageRepository) -> Result<Self> {
        let session_dir = TempDir::new().map_err(|e| {
            Error::Internal(format!("Failed to create handle session directory: {}", e))
        })?;

        Ok(Self {
            repo,
            session_dir,
            live: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    /// Resolve an artifact for display, reusing a live handle when one
    /// exists. Any failure to reconstruct the bytes degrades to `Missing`.
    pub async fn acquire(&self, id: Uuid) -> Resolution {
        if let Some(handle) = self.live.read().unwrap().get(&id) {
            return Resolution::Live(handle.clone());
        }
        self.mint(id).await
    }

    /// Revoke the live handle for an id, if any. Safe to call when none is
    /// live.
    pub async fn release(&self, id: Uuid) {
        let previous = self.live.write().unwrap().remove(&id);
        if let Some(handle) = previous {
            let _ = tokio::fs::remove_file(&handle.path).await;
            tracing::debug!(artifact_id = %id, "Released display handle");
        }
    }

    /// Revoke and re-mint, returning a handle with a fresh path so stale
    /// consumer caches cannot alias the old one.
    pub async fn force_refresh(&self, id: Uuid) -> Resolution {
        self.release(id).await;
        self.mint(id).await
    }

    /// Revoke every live handle. Used when the store is rebuilt.
    pub async fn release_all(&self) {
        let drained: Vec<DisplayHandle> = {
            let mut live = self.live.write().unwrap();
            live.drain().map(|(_, handle)| handle).collect()
        };
        for handle in drained {
            let _ = tokio::fs::remove_file(&handle.path).await;
        }
    }

    /// Number of currently live handles.
    pub fn live_count(&self) -> usize {
        self.live.read().unwrap().len()
    }

    async fn mint(&self, id: Uuid) -> Resolution {
        let stored = match self.repo.get(id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!(artifact_id = %id, "Artifact not in store, resolving as missing");
                return Resolution::Missing;
            }
            Err(e) => {
                tracing::warn!(artifact_id = %id, error = %e, "Store read failed, degrading to missing");
                return Resolution::Missing;
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let filename = format!(
            "{}-{}.{}",
            id,
            generation,
            extension_for(&stored.payload.content_type)
        );
        let path = self.session_dir.path().join(filename);

        if let Err(e) = tokio::fs::write(&path, &stored.payload.bytes).await {
            tracing::warn!(artifact_id = %id, error = %e, "Handle write failed, degrading to missing");
            return Resolution::Missing;
        }

        let handle = DisplayHandle {
            artifact_id: id,
            path,
            content_type: stored.payload.content_type,
        };

        let previous = self
            .live
            .write()
            .unwrap()
            .insert(id, handle.clone());
        if let Some(prev) = previous {
            // A concurrent mint for the same id lost the race; its file is
            // no longer reachable through the cache.
            let _ = tokio::fs::remove_file(&prev.path).await;
        }

        tracing::debug!(artifact_id = %id, path = %handle.path.display(), "Minted display handle");
        Resolution::Live(handle)
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "img",
    }
}
