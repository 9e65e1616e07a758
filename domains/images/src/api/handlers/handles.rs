//! Display handle API handlers
//!
//! A missing artifact resolves to 404 `ARTIFACT_MISSING`; the UI shell
//! renders that as its defined missing state with a retry affordance.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use easel_common::{Error, Result};

use crate::api::middleware::ImagesState;
use crate::handles::{DisplayHandle, Resolution};

/// Display handle response DTO
#[derive(Debug, Serialize)]
pub struct HandleResponse {
    pub artifact_id: Uuid,
    /// Session-local resource reference loadable by the rendering surface
    pub resource_ref: String,
    pub content_type: String,
}

impl From<DisplayHandle> for HandleResponse {
    fn from(h: DisplayHandle) -> Self {
        Self {
            artifact_id: h.artifact_id,
            resource_ref: h.path.display().to_string(),
            content_type: h.content_type,
        }
    }
}

/// Resolve an artifact for display, minting a handle if needed
pub async fn acquire_handle(
    State(state): State<ImagesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HandleResponse>> {
    match state.handles.acquire(id).await {
        Resolution::Live(handle) => Ok(Json(handle.into())),
        Resolution::Missing => Err(Error::ArtifactMissing(id)),
    }
}

/// Release the live handle for an artifact, if any
pub async fn release_handle(
    State(state): State<ImagesState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.handles.release(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Revoke and re-mint the handle for an artifact
pub async fn refresh_handle(
    State(state): State<ImagesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HandleResponse>> {
    match state.handles.force_refresh(id).await {
        Resolution::Live(handle) => Ok(Json(handle.into())),
        Resolution::Missing => Err(Error::ArtifactMissing(id)),
    }
}
