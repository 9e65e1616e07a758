//! Easel Image Providers
//!
//! Ordered image generation strategies for the generation pipeline:
//! - Gemini inline-data image generation for production
//! - Pollinations URL-based generation as a secondary strategy
//! - Response sanity validation (size + magic-byte sniffing)
//! - Deterministic local placeholder renderer (the guaranteed fallback)
//! - Programmable mock provider for testing and development

pub mod gemini;
pub mod mock;
pub mod placeholder;
pub mod pollinations;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider configuration error: {0}")]
    Configuration(String),

    #[error("Provider request error: {0}")]
    Request(String),

    #[error("Provider response error: {0}")]
    Response(String),

    #[error("Invalid image response: {0}")]
    InvalidImage(String),
}

/// Minimum plausible byte length for a generated image. Anything smaller is
/// rejected before sniffing (a ten-byte body is never a real render).
pub const MIN_IMAGE_BYTES: usize = 32;

/// Image bytes plus their declared media type, as returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Ordered provider names, highest priority first
    pub chain: Vec<String>,
    /// Opaque credential for credentialed providers (Gemini)
    pub api_key: Option<String>,
    /// Base URL overrides, used by tests and self-hosted deployments
    pub gemini_base_url: Option<String>,
    pub pollinations_base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("chain", &self.chain)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("pollinations_base_url", &self.pollinations_base_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(chain: Vec<String>, api_key: Option<String>) -> Self {
        Self {
            chain,
            api_key,
            gemini_base_url: None,
            pollinations_base_url: None,
        }
    }
}

/// One independent strategy for producing image bytes from a text prompt.
///
/// Strategies are pure request/response calls: no shared state, no knowledge
/// of other strategies, no retry policy of their own.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Stable strategy identity, persisted with artifacts it produced
    fn name(&self) -> &str;

    /// Generate image bytes for the prompt.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError>;
}

/// Sanity-check a provider response before accepting it as a success.
///
/// An empty body, an implausibly small body, or bytes that do not carry a
/// known raster-image signature (an HTML error page served with a 200, say)
/// are all rejected. On success returns the sniffed media type, which
/// overrides whatever the provider declared.
pub fn validate_image(image: &GeneratedImage) -> Result<&'static str, ProviderError> {
    if image.bytes.is_empty() {
        return Err(ProviderError::InvalidImage(
            "response body is empty".to_string(),
        ));
    }

    if image.bytes.len() < MIN_IMAGE_BYTES {
        return Err(ProviderError::InvalidImage(format!(
            "response body is too small to be an image ({} bytes)",
            image.bytes.len()
        )));
    }

    let format = ::image::guess_format(&image.bytes).map_err(|_| {
        ProviderError::InvalidImage(format!(
            "bytes are not a recognized image format (declared {})",
            image.content_type
        ))
    })?;

    Ok(format.to_mime_type())
}

/// Factory for assembling the ordered provider chain
pub struct ProviderChainFactory;

impl ProviderChainFactory {
    pub fn create(config: ProviderConfig) -> Result<Vec<Box<dyn ImageProvider>>, ProviderError> {
        let mut providers: Vec<Box<dyn ImageProvider>> = Vec::with_capacity(config.chain.len());

        for name in &config.chain {
            match name.as_str() {
                "gemini" => {
                    tracing::info!("Adding Gemini image provider to chain");
                    providers.push(Box::new(gemini::GeminiImageProvider::new(
                        config.api_key.clone(),
                        config.gemini_base_url.clone(),
                    )));
                }
                "pollinations" => {
                    tracing::info!("Adding Pollinations image provider to chain");
                    providers.push(Box::new(pollinations::PollinationsProvider::new(
                        config.pollinations_base_url.clone(),
                    )));
                }
                "mock" => {
                    tracing::info!("Adding mock image provider to chain");
                    providers.push(Box::new(mock::MockImageProvider::new()));
                }
                provider => {
                    return Err(ProviderError::Configuration(format!(
                        "Unknown image provider: {}. Supported providers: gemini, pollinations, mock",
                        provider
                    )));
                }
            }
        }

        if providers.is_empty() {
            return Err(ProviderError::Configuration(
                "Image provider chain is empty".to_string(),
            ));
        }

        Ok(providers)
    }
}
