//! Easel application composition root
//!
//! Wires the store, refiner, provider chain, handle cache, and health
//! monitor into a single application router.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use easel_common::Config;
use easel_images::{
    GenerationService, HandleCache, HealthMonitor, ImageRepository, ImagesState, PromptRefiner,
};
use easel_llm::{LlmConfig, LlmServiceFactory};
use easel_providers::{ProviderChainFactory, ProviderConfig};

/// Create the main application router with all routes and state
pub async fn create_app(config: Config) -> Result<Router, anyhow::Error> {
    // Open the store and bring its schema current
    let repo = ImageRepository::open(
        Path::new(&config.database_path),
        config.max_store_bytes,
    )
    .await?;

    // Prompt refiner over the configured completion backend
    let llm = LlmServiceFactory::create(LlmConfig::new(
        config.llm_provider.clone(),
        config.gemini_api_key.clone(),
    ))?;
    let refiner = PromptRefiner::new(Arc::from(llm));

    // Ordered provider chain; the pipeline's placeholder fallback sits
    // behind it, not in it
    let providers = ProviderChainFactory::create(ProviderConfig::new(
        config.provider_chain(),
        config.gemini_api_key.clone(),
    ))?;

    let generator = GenerationService::new(refiner, providers, repo.clone());
    let handles = Arc::new(HandleCache::new(repo.clone())?);
    let monitor = HealthMonitor::new(repo.clone());

    let state = ImagesState {
        repo,
        handles,
        generator,
        monitor,
    };

    // Build router: compose domain routes with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Easel API v0.1.0" }))
        .merge(easel_images::routes().with_state(state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
