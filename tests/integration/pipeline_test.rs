//! Generation pipeline integration tests: ordered fallback, response
//! validation, refinement degradation, and the guaranteed local fallback.

mod common;

use std::sync::atomic::Ordering;

use easel_images::{HandleCache, Resolution, FALLBACK_SOURCE};
use easel_llm::mock::{MockLlmOutcome, MockLlmService};
use easel_providers::mock::{png_fixture, MockImageProvider, MockProviderOutcome};
use easel_providers::GeneratedImage;

use common::{generation_service, memory_repo};

#[tokio::test]
async fn pipeline_never_fails_when_every_provider_fails() {
    let repo = memory_repo().await;

    let a = MockImageProvider::named("a");
    a.behavior().set_outcome(MockProviderOutcome::FailRequest);
    let b = MockImageProvider::named("b");
    b.behavior().set_outcome(MockProviderOutcome::FailRequest);

    let llm = MockLlmService::new();
    llm.behavior().set_response("a refined sunset");
    let service = generation_service(repo.clone(), vec![Box::new(a), Box::new(b)], llm);

    let artifact = service
        .generate("a sunset")
        .await
        .expect("pipeline is failure-free when providers fail");

    assert_eq!(artifact.source, FALLBACK_SOURCE);
    assert!(artifact.size_bytes > 0);

    // The placeholder is a persisted artifact like any other
    let stored = repo.get(artifact.id).await.unwrap().unwrap();
    assert!(!stored.payload.bytes.is_empty());
    let svg = String::from_utf8(stored.payload.bytes).unwrap();
    assert!(svg.contains("a refined sunset"));
}

#[tokio::test]
async fn first_success_wins_and_order_encodes_priority() {
    let repo = memory_repo().await;

    let a = MockImageProvider::named("a");
    a.behavior().set_outcome(MockProviderOutcome::FailRequest);

    let b = MockImageProvider::named("b");
    let b_bytes = png_fixture(2048);
    b.behavior().set_payload(GeneratedImage {
        content_type: "image/png".to_string(),
        bytes: b_bytes.clone(),
    });

    let c = MockImageProvider::named("c");
    let c_calls = c.call_counter();

    let llm = MockLlmService::new();
    let service =
        generation_service(repo.clone(), vec![Box::new(a), Box::new(b), Box::new(c)], llm);

    let artifact = service.generate("anything").await.unwrap();

    assert_eq!(artifact.source, "b");
    assert_eq!(
        c_calls.load(Ordering::SeqCst),
        0,
        "later strategies must never run after a success"
    );

    let stored = repo.get(artifact.id).await.unwrap().unwrap();
    assert_eq!(stored.payload.bytes, b_bytes);
}

#[tokio::test]
async fn refinement_failure_degrades_to_original_prompt() {
    let repo = memory_repo().await;

    let llm = MockLlmService::new();
    llm.behavior().set_outcome(MockLlmOutcome::Fail);
    let service = generation_service(repo.clone(), vec![Box::new(MockImageProvider::new())], llm);

    let artifact = service.generate("a red bicycle").await.unwrap();

    assert_eq!(artifact.original_prompt, "a red bicycle");
    assert_eq!(artifact.refined_prompt, "a red bicycle");
}

/// The worked example: provider 1 throws, provider 2 answers with a ten-byte
/// non-image, provider 3 returns a valid 50000-byte PNG.
#[tokio::test]
async fn red_bicycle_scenario() {
    let repo = memory_repo().await;

    let p1 = MockImageProvider::named("p1");
    p1.behavior().set_outcome(MockProviderOutcome::FailRequest);

    let p2 = MockImageProvider::named("p2");
    p2.behavior().set_payload(GeneratedImage {
        content_type: "image/png".to_string(),
        bytes: vec![0u8; 10],
    });

    let p3 = MockImageProvider::named("p3");
    let png = png_fixture(50_000);
    p3.behavior().set_payload(GeneratedImage {
        content_type: "image/png".to_string(),
        bytes: png.clone(),
    });

    let llm = MockLlmService::new();
    llm.behavior().set_response("a shiny red bicycle, studio light");
    let service = generation_service(
        repo.clone(),
        vec![Box::new(p1), Box::new(p2), Box::new(p3)],
        llm,
    );

    let artifact = service.generate("a red bicycle").await.unwrap();

    assert_eq!(artifact.source, "p3");
    assert_eq!(artifact.original_prompt, "a red bicycle");
    assert_eq!(artifact.size_bytes, 50_000);
    assert_eq!(artifact.content_type, "image/png");

    // A later acquire returns a handle wrapping those same bytes
    let cache = HandleCache::new(repo).expect("handle cache opens");
    let handle = match cache.acquire(artifact.id).await {
        Resolution::Live(handle) => handle,
        Resolution::Missing => panic!("artifact was just persisted"),
    };
    let served = tokio::fs::read(&handle.path).await.unwrap();
    assert_eq!(served, png);
}

#[tokio::test]
async fn pipeline_sends_refined_prompt_to_providers() {
    let repo = memory_repo().await;

    let llm = MockLlmService::new();
    llm.behavior().set_response("a refined prompt");
    let provider = MockImageProvider::new();
    let service = generation_service(repo, vec![Box::new(provider)], llm.clone());

    let artifact = service.generate("raw prompt").await.unwrap();
    assert_eq!(artifact.original_prompt, "raw prompt");
    assert_eq!(artifact.refined_prompt, "a refined prompt");
}
