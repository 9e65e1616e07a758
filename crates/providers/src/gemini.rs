//! Gemini Image Provider
//!
//! Calls the Gemini image model through generateContent and decodes the
//! base64 inline image data from the response.

use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{GeneratedImage, ImageProvider, ProviderError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// generateContent request body for image output
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<ContentBody>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentBody {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "imageConfig")]
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Gemini image generation strategy
pub struct GeminiImageProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiImageProvider {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl ImageProvider for GeminiImageProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::Configuration("No API credential configured".to_string())
        })?;

        let body = GenerateContentRequest {
            contents: vec![ContentBody {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                },
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, IMAGE_MODEL
        );

        tracing::debug!(model = IMAGE_MODEL, "Sending Gemini image request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ProviderError::Response(format!(
                "Gemini API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Response(format!("Failed to parse response: {}", e)))?;

        // The image arrives as one inline-data part among the candidates
        let inline = api_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .filter_map(|c| c.parts)
            .flatten()
            .find_map(|part| part.inline_data)
            .ok_or_else(|| {
                ProviderError::Response("No image data found in response".to_string())
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| {
                ProviderError::Response(format!("Failed to decode inline image data: {}", e))
            })?;

        Ok(GeneratedImage {
            content_type: inline.mime_type,
            bytes,
        })
    }
}
