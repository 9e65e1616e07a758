//! Mock Image Provider Implementation
//!
//! Programmable mock for testing pipeline workflows:
//! - `MockImageProvider`: configurable mock with invocation counting
//! - `MockProviderBehavior`: controls outcome and success payload
//! - `MockProviderOutcome`: Succeed, FailRequest, EmptyBody, or NotAnImage

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, RwLock,
};

use crate::{GeneratedImage, ImageProvider, ProviderError};

/// A synthetic PNG body: real signature, zero-padded to `len` bytes.
/// Recognized by magic-byte sniffing without carrying a full encode.
pub fn png_fixture(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}

/// What outcome the mock should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockProviderOutcome {
    /// Return the configured payload (or a default PNG fixture)
    #[default]
    Succeed,
    /// Fail with a request error
    FailRequest,
    /// Return a zero-byte body (invalid success)
    EmptyBody,
    /// Return an HTML error page declared as an image (invalid success)
    NotAnImage,
}

/// Programmable behavior for the mock image provider
#[derive(Debug, Clone, Default)]
pub struct MockProviderBehavior {
    pub outcome: Arc<RwLock<MockProviderOutcome>>,
    pub payload: Arc<RwLock<Option<GeneratedImage>>>,
}

impl MockProviderBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock outcome
    pub fn set_outcome(&self, outcome: MockProviderOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    /// Configure the payload returned on success
    pub fn set_payload(&self, payload: GeneratedImage) {
        *self.payload.write().unwrap() = Some(payload);
    }

    /// Reset to default behavior
    pub fn reset(&self) {
        *self.outcome.write().unwrap() = MockProviderOutcome::Succeed;
        *self.payload.write().unwrap() = None;
    }

    pub fn get_outcome(&self) -> MockProviderOutcome {
        self.outcome.read().unwrap().clone()
    }
}

/// Mock image provider with programmable behavior
#[derive(Debug, Clone)]
pub struct MockImageProvider {
    name: String,
    behavior: Arc<MockProviderBehavior>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a mock with a distinct strategy name, for chain-order tests
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: Arc::new(MockProviderBehavior::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_behavior(name: impl Into<String>, behavior: Arc<MockProviderBehavior>) -> Self {
        Self {
            name: name.into(),
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the shared behavior for external configuration
    pub fn behavior(&self) -> &Arc<MockProviderBehavior> {
        &self.behavior
    }

    /// Number of generate calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared counter handle, usable after the provider is boxed into a chain
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        tracing::info!(provider = %self.name, prompt = %prompt, "Mock provider: generate");
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior.get_outcome() {
            MockProviderOutcome::Succeed => {
                let payload = self.behavior.payload.read().unwrap().clone();
                Ok(payload.unwrap_or_else(|| GeneratedImage {
                    content_type: "image/png".to_string(),
                    bytes: png_fixture(256),
                }))
            }
            MockProviderOutcome::FailRequest => Err(ProviderError::Request(format!(
                "Mock provider {} failure",
                self.name
            ))),
            MockProviderOutcome::EmptyBody => Ok(GeneratedImage {
                content_type: "image/png".to_string(),
                bytes: Vec::new(),
            }),
            MockProviderOutcome::NotAnImage => Ok(GeneratedImage {
                content_type: "image/png".to_string(),
                bytes: b"<html><body>Bad Gateway</body></html>".to_vec(),
            }),
        }
    }
}
