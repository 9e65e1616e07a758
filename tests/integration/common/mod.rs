//! Shared helpers for the Easel integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;

use easel_images::{
    GenerationService, HandleCache, HealthMonitor, ImageArtifact, ImageRepository, ImagesState,
    Payload, PromptRefiner,
};
use easel_llm::mock::MockLlmService;
use easel_providers::ImageProvider;

/// Store budget large enough that tests never trip the quota by accident
pub const TEST_STORE_BYTES: i64 = 10_485_760;

/// Fresh in-memory store at the current schema version
pub async fn memory_repo() -> ImageRepository {
    ImageRepository::open_in_memory(TEST_STORE_BYTES)
        .await
        .expect("in-memory store opens")
}

/// A PNG-typed payload of the given length
pub fn payload(len: usize) -> Payload {
    Payload::new("image/png", vec![0x42u8; len])
}

/// Insert one record and return it
pub async fn seed(repo: &ImageRepository, prompt: &str) -> ImageArtifact {
    let p = payload(128);
    let artifact = ImageArtifact::new(prompt, prompt, "mock", &p).expect("artifact is valid");
    repo.put(&artifact, &p).await.expect("seed put succeeds");
    artifact
}

/// Generation service over the given provider chain with a well-behaved
/// mock refiner
pub fn generation_service(
    repo: ImageRepository,
    providers: Vec<Box<dyn ImageProvider>>,
    llm: MockLlmService,
) -> GenerationService {
    GenerationService::new(PromptRefiner::new(Arc::new(llm)), providers, repo)
}

/// Full domain state over mocks, for router-level tests
pub fn build_state(
    repo: ImageRepository,
    providers: Vec<Box<dyn ImageProvider>>,
    llm: MockLlmService,
) -> ImagesState {
    let handles = Arc::new(HandleCache::new(repo.clone()).expect("handle cache opens"));
    let generator = generation_service(repo.clone(), providers, llm);
    let monitor = HealthMonitor::new(repo.clone());
    ImagesState {
        repo,
        handles,
        generator,
        monitor,
    }
}

/// Router with the domain routes mounted, as the app composes it
pub fn build_router(state: ImagesState) -> Router {
    Router::new().merge(easel_images::routes().with_state(state))
}
