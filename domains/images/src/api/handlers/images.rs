//! Image management API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use easel_common::{Error, Result, ValidatedJson};

use crate::api::middleware::ImagesState;
use crate::domain::entities::ImageArtifact;

/// Request for generating a new image
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateImageRequest {
    /// Free-text description of the desired image
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
}

/// Image artifact response DTO (metadata only; bytes travel via handles)
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub original_prompt: String,
    pub refined_prompt: String,
    pub source: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ImageArtifact> for ImageResponse {
    fn from(a: ImageArtifact) -> Self {
        Self {
            id: a.id,
            original_prompt: a.original_prompt,
            refined_prompt: a.refined_prompt,
            source: a.source,
            content_type: a.content_type,
            size_bytes: a.size_bytes,
            created_at: a.created_at,
        }
    }
}

/// List every stored image, newest first
pub async fn list_images(
    State(state): State<ImagesState>,
) -> Result<Json<Vec<ImageResponse>>> {
    let images = state.repo.get_all().await?;

    let responses: Vec<ImageResponse> = images
        .into_iter()
        .map(|stored| stored.artifact.into())
        .collect();
    Ok(Json(responses))
}

/// Get a single image's metadata by ID
pub async fn get_image(
    State(state): State<ImagesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImageResponse>> {
    let stored = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Image not found".to_string()))?;

    Ok(Json(stored.artifact.into()))
}

/// Generate and persist a new image
pub async fn generate_image(
    State(state): State<ImagesState>,
    ValidatedJson(req): ValidatedJson<GenerateImageRequest>,
) -> Result<(StatusCode, Json<ImageResponse>)> {
    let artifact = state.generator.generate(&req.prompt).await?;
    Ok((StatusCode::CREATED, Json(artifact.into())))
}

/// Delete an image. Idempotent: deleting a nonexistent id is a no-op.
pub async fn delete_image(
    State(state): State<ImagesState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.repo.delete(id).await?;
    // A live handle for a deleted record would serve stale bytes
    state.handles.release(id).await;
    Ok(StatusCode::NO_CONTENT)
}
