//! Generation pipeline
//!
//! Produces artifact bytes with high overall reliability despite using
//! individually unreliable providers: strategies are attempted strictly in
//! order, the first validated success wins, and a locally rendered
//! placeholder guarantees the pipeline always has bytes to persist. Only
//! store-layer failures on the final write can reach the caller.

use std::sync::Arc;

use easel_common::{Error, Result};
use easel_providers::{placeholder, validate_image, GeneratedImage, ImageProvider};

use crate::domain::entities::{ImageArtifact, Payload};
use crate::refiner::PromptRefiner;
use crate::repository::ImageRepository;

/// Strategy identity recorded for locally rendered fallbacks
pub const FALLBACK_SOURCE: &str = "placeholder";

#[derive(Clone)]
pub struct GenerationService {
    refiner: PromptRefiner,
    providers: Arc<Vec<Box<dyn ImageProvider>>>,
    repo: ImageRepository,
}

impl GenerationService {
    pub fn new(
        refiner: PromptRefiner,
        providers: Vec<Box<dyn ImageProvider>>,
        repo: ImageRepository,
    ) -> Self {
        Self {
            refiner,
            providers: Arc::new(providers),
            repo,
        }
    }

    /// Generate and persist an artifact for a free-text description.
    ///
    /// Runs to completion once started: refinement failures degrade to the
    /// original text, provider failures advance the chain, and an exhausted
    /// chain falls back to the local placeholder. The only errors are an
    /// empty description and store failures on the final write.
    pub async fn generate(&self, description: &str) -> Result<ImageArtifact> {
        let original = description.trim();
        if original.is_empty() {
            return Err(Error::Validation(
                "Generation prompt must not be empty".to_string(),
            ));
        }

        let refined = self.refiner.refine(original).await;
        let (image, source) = self.produce(&refined).await;

        let payload = Payload::new(image.content_type, image.bytes);
        let artifact = ImageArtifact::new(original, &refined, &source, &payload)?;
        self.repo.put(&artifact, &payload).await?;

        tracing::info!(
            artifact_id = %artifact.id,
            source = %source,
            size_bytes = artifact.size_bytes,
            "Generated artifact persisted"
        );
        Ok(artifact)
    }

    /// Walk the provider chain in order; first validated success wins.
    async fn produce(&self, prompt: &str) -> (GeneratedImage, String) {
        for provider in self.providers.iter() {
            match provider.generate(prompt).await {
                Ok(mut image) => match validate_image(&image) {
                    Ok(sniffed) => {
                        // The sniffed format is authoritative over whatever
                        // the provider declared
                        image.content_type = sniffed.to_string();
                        tracing::info!(provider = provider.name(), "Provider strategy succeeded");
                        return (image, provider.name().to_string());
                    }
                    Err(e) => {
                        tracing::warn!(
                            provider = provider.name(),
                            error = %e,
                            "Provider returned an invalid image, advancing to next strategy"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, advancing to next strategy"
                    );
                }
            }
        }

        tracing::warn!("All provider strategies failed, rendering local placeholder");
        (placeholder::render(prompt), FALLBACK_SOURCE.to_string())
    }
}
