//! Shared utilities, configuration, and error handling for Easel
//!
//! This crate provides common functionality used across the Easel application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Payload checksum utilities
//! - Validated request extraction

pub mod config;
pub mod crypto;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use crypto::{payload_checksum, verify_checksum};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
