//! Domain entities for the Images domain
//!
//! This module contains the durable artifact record and its payload type.
//! Each entity includes proper validation, serialization, and business rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use easel_common::{payload_checksum, Error, Result};

/// Maximum payload size (25 MiB)
pub const MAX_PAYLOAD_BYTES: i64 = 26_214_400;

/// Raw image bytes plus their media type.
///
/// This is the typed form the binary codec produces and consumes; the store
/// never persists it directly, only its encoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Image artifact entity: one durably stored generation result.
///
/// Records are immutable once written: created exactly once by the
/// generation pipeline, read many times, deleted only explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImageArtifact {
    pub id: Uuid,
    pub original_prompt: String,
    pub refined_prompt: String,
    pub source: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

/// A record together with its reconstructed payload, as returned by reads
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub artifact: ImageArtifact,
    pub payload: Payload,
}

impl ImageArtifact {
    /// Create a new artifact record for a payload with validation.
    ///
    /// An empty refined prompt falls back to the original prompt, so the
    /// refined prompt is never empty even when refinement failed upstream.
    pub fn new(
        original_prompt: &str,
        refined_prompt: &str,
        source: &str,
        payload: &Payload,
    ) -> Result<Self> {
        let original = original_prompt.trim();
        let refined = refined_prompt.trim();
        let refined = if refined.is_empty() { original } else { refined };

        let artifact = Self {
            id: Uuid::new_v4(),
            original_prompt: original.to_string(),
            refined_prompt: refined.to_string(),
            source: source.to_string(),
            content_type: payload.content_type.clone(),
            size_bytes: payload.bytes.len() as i64,
            checksum: payload_checksum(&payload.bytes),
            created_at: Utc::now(),
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.original_prompt.trim().is_empty() {
            return Err(Error::Validation(
                "Original prompt must not be empty".to_string(),
            ));
        }

        if self.refined_prompt.trim().is_empty() {
            return Err(Error::Validation(
                "Refined prompt must not be empty".to_string(),
            ));
        }

        if self.source.trim().is_empty() {
            return Err(Error::Validation(
                "Artifact source must not be empty".to_string(),
            ));
        }

        if !self.content_type.starts_with("image/") {
            return Err(Error::Validation(format!(
                "Content type '{}' is not an image type",
                self.content_type
            )));
        }

        if self.size_bytes <= 0 {
            return Err(Error::Validation(
                "Payload size must be positive".to_string(),
            ));
        }
        if self.size_bytes > MAX_PAYLOAD_BYTES {
            return Err(Error::Validation(format!(
                "Payload size exceeds maximum of {} bytes",
                MAX_PAYLOAD_BYTES
            )));
        }

        if self.checksum.len() != 64 {
            return Err(Error::Validation(
                "Checksum must be a 64-character hex digest".to_string(),
            ));
        }

        Ok(())
    }
}
