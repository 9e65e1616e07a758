//! Pollinations Image Provider
//!
//! Fetches an image directly from the Pollinations prompt endpoint. The
//! service renders the prompt encoded into the URL path and answers with
//! raw image bytes.

use reqwest::{Client, Url};

use crate::{GeneratedImage, ImageProvider, ProviderError};

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai";
const IMAGE_WIDTH: u32 = 1024;
const IMAGE_HEIGHT: u32 = 1024;

/// Pollinations image generation strategy (no credential required)
pub struct PollinationsProvider {
    client: Client,
    base_url: String,
}

impl PollinationsProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn prompt_url(&self, prompt: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Configuration(format!("Invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ProviderError::Configuration("Base URL cannot be a base".to_string()))?
            .push("prompt")
            .push(prompt);

        url.query_pairs_mut()
            .append_pair("width", &IMAGE_WIDTH.to_string())
            .append_pair("height", &IMAGE_HEIGHT.to_string())
            .append_pair("nologo", "true");

        Ok(url)
    }
}

#[async_trait::async_trait]
impl ImageProvider for PollinationsProvider {
    fn name(&self) -> &str {
        "pollinations"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let url = self.prompt_url(prompt)?;

        tracing::debug!(url = %url, "Fetching Pollinations image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Response(format!(
                "Pollinations returned {}",
                status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Response(format!("Failed to read body: {}", e)))?
            .to_vec();

        Ok(GeneratedImage {
            content_type,
            bytes,
        })
    }
}
