//! Store health monitor
//!
//! Read-only audit of the artifact store plus the destructive recovery
//! path. The check walks every record and verifies its bytes are
//! reconstructible and untampered; rebuild wipes the store rather than
//! attempting partial repair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use easel_common::{verify_checksum, Error, Result};

use crate::repository::ImageRepository;

/// Overall store state as classified by a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StoreHealth {
    /// Zero records
    Empty,
    /// Every record readable, non-empty, and checksum-verified
    Healthy { records: usize, total_bytes: i64 },
    /// At least one record cannot be reconstructed
    Corrupt {
        records: usize,
        corrupt_ids: Vec<Uuid>,
    },
}

#[derive(Clone)]
pub struct HealthMonitor {
    repo: ImageRepository,
}

impl HealthMonitor {
    pub fn new(repo: ImageRepository) -> Self {
        Self { repo }
    }

    /// Classify the store. Mutates nothing; store-availability errors
    /// propagate, per-record corruption is collected and reported.
    pub async fn check(&self) -> Result<StoreHealth> {
        let ids = self.repo.ids().await?;
        if ids.is_empty() {
            return Ok(StoreHealth::Empty);
        }

        let mut corrupt_ids = Vec::new();
        let mut total_bytes = 0i64;

        for id in &ids {
            match self.repo.get(*id).await {
                Ok(Some(stored)) => {
                    if stored.payload.bytes.is_empty()
                        || !verify_checksum(&stored.payload.bytes, &stored.artifact.checksum)
                    {
                        corrupt_ids.push(*id);
                    } else {
                        total_bytes += stored.artifact.size_bytes;
                    }
                }
                // Deleted out from under the walk; nothing left to verify
                Ok(None) => {}
                Err(Error::CorruptRecord(_)) => corrupt_ids.push(*id),
                Err(e) => return Err(e),
            }
        }

        if corrupt_ids.is_empty() {
            Ok(StoreHealth::Healthy {
                records: ids.len(),
                total_bytes,
            })
        } else {
            tracing::warn!(
                corrupt = corrupt_ids.len(),
                total = ids.len(),
                "Health check found unreconstructible records"
            );
            Ok(StoreHealth::Corrupt {
                records: ids.len(),
                corrupt_ids,
            })
        }
    }

    /// Irrecoverably delete every record. Destructive by design: once
    /// corruption is detected the system prefers a clean, known-empty state
    /// over guessing at partial recovery. Consumers gate this behind
    /// explicit user confirmation.
    pub async fn rebuild(&self) -> Result<u64> {
        let deleted = self.repo.delete_all().await?;
        tracing::warn!(deleted, "Store rebuilt: all records deleted");
        Ok(deleted)
    }
}
