//! Route definitions for the Images domain API

use axum::{routing::get, Router};

use super::handlers::{handles, images, store};
use super::middleware::ImagesState;

/// Create image routes
fn image_routes() -> Router<ImagesState> {
    Router::new()
        .route("/v1/images", get(images::list_images))
        .route(
            "/v1/images/{id}",
            get(images::get_image).delete(images::delete_image),
        )
        .route(
            "/v1/generations",
            axum::routing::post(images::generate_image),
        )
}

/// Create display handle routes
fn handle_routes() -> Router<ImagesState> {
    Router::new()
        .route(
            "/v1/images/{id}/handle",
            get(handles::acquire_handle).delete(handles::release_handle),
        )
        .route(
            "/v1/images/{id}/handle/refresh",
            axum::routing::post(handles::refresh_handle),
        )
}

/// Create store diagnostic routes
fn store_routes() -> Router<ImagesState> {
    Router::new()
        .route("/v1/store/health", get(store::store_health))
        .route("/v1/store/rebuild", axum::routing::post(store::rebuild_store))
}

/// Create all Images domain API routes
pub fn routes() -> Router<ImagesState> {
    Router::new()
        .merge(image_routes())
        .merge(handle_routes())
        .merge(store_routes())
}
