//! Store diagnostic API handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use easel_common::{Error, Result, ValidatedJson};

use crate::api::middleware::ImagesState;
use crate::health::StoreHealth;

/// Request for the destructive store rebuild
#[derive(Debug, Deserialize, Validate)]
pub struct RebuildRequest {
    /// Must be true; the rebuild deletes every stored artifact
    #[serde(default)]
    pub confirm: bool,
}

/// Rebuild response DTO
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub deleted: u64,
}

/// Run a read-only health check over the store
pub async fn store_health(State(state): State<ImagesState>) -> Result<Json<StoreHealth>> {
    let health = state.monitor.check().await?;
    Ok(Json(health))
}

/// Destructively rebuild the store. Gated behind explicit confirmation.
pub async fn rebuild_store(
    State(state): State<ImagesState>,
    ValidatedJson(req): ValidatedJson<RebuildRequest>,
) -> Result<Json<RebuildResponse>> {
    if !req.confirm {
        return Err(Error::Validation(
            "Rebuild deletes every stored artifact and requires \"confirm\": true".to_string(),
        ));
    }

    let deleted = state.monitor.rebuild().await?;
    // Every live handle now points at deleted records
    state.handles.release_all().await;

    Ok(Json(RebuildResponse { deleted }))
}
