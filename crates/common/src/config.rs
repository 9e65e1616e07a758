//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default byte budget for the on-device store (512 MiB)
const DEFAULT_MAX_STORE_BYTES: i64 = 536_870_912;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite database file holding the artifact store
    pub database_path: String,

    /// Opaque credential for the Gemini refinement and image APIs.
    /// Optional: without it the refiner passes prompts through unchanged
    /// and credentialed providers report failure.
    pub gemini_api_key: Option<String>,

    /// Text-completion backend used by the prompt refiner ("gemini" or "mock")
    pub llm_provider: String,

    /// Ordered, comma-separated image provider chain, highest priority first
    pub image_providers: String,

    /// Byte budget for stored payloads; writes past it are rejected
    pub max_store_bytes: i64,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_path: env::var("EASEL_DATABASE_PATH")
                .unwrap_or_else(|_| "data/easel.db".to_string()),

            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),

            llm_provider: env::var("EASEL_LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string()),

            image_providers: env::var("EASEL_IMAGE_PROVIDERS")
                .unwrap_or_else(|_| "gemini,pollinations".to_string()),

            max_store_bytes: env::var("EASEL_MAX_STORE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_STORE_BYTES),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "easel=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        if config.max_store_bytes <= 0 {
            return Err(anyhow::anyhow!(
                "EASEL_MAX_STORE_BYTES must be a positive byte count"
            ));
        }

        Ok(config)
    }

    /// Ordered provider names from the configured chain, empty entries skipped
    pub fn provider_chain(&self) -> Vec<String> {
        self.image_providers
            .split(',')
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect()
    }
}
