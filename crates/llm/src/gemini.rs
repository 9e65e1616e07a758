//! Gemini API Implementation
//!
//! Calls the Gemini generateContent API
//! (https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent)
//! using reqwest HTTP client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmService};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentBody>,
    contents: Vec<ContentBody>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: i32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: i32,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    status: Option<String>,
    message: String,
}

/// Gemini LLM service implementation
pub struct GeminiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl GeminiService {
    /// Create a new Gemini service
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("No API credential configured".to_string()))?;

        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        let contents: Vec<ContentBody> = request
            .messages
            .iter()
            .map(|m| ContentBody {
                role: Some(match m.role {
                    crate::LlmRole::User => "user".to_string(),
                    crate::LlmRole::Assistant => "model".to_string(),
                }),
                parts: vec![TextPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let body = GenerateContentRequest {
            system_instruction: request.system_prompt.map(|text| ContentBody {
                role: None,
                parts: vec![TextPart { text }],
            }),
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
            },
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        tracing::debug!(model = %model, max_tokens = %max_tokens, "Sending Gemini API request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(LlmError::Response(format!(
                    "Gemini API error ({}): {}",
                    error_response.error.status.unwrap_or_default(),
                    error_response.error.message
                )));
            }

            return Err(LlmError::Response(format!(
                "Gemini API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let candidate = api_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Response("No candidates in response".to_string()))?;

        // Extract text content from the candidate parts
        let content = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        let usage = api_response.usage_metadata.unwrap_or(UsageMetadata {
            prompt_token_count: 0,
            candidates_token_count: 0,
        });

        Ok(CompletionResponse {
            content,
            model,
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            stop_reason: candidate
                .finish_reason
                .unwrap_or_else(|| "STOP".to_string()),
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
