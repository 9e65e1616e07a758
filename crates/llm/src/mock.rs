//! Mock LLM Service Implementation
//!
//! Programmable mock used by `LlmServiceFactory` when provider is `"mock"`:
//! - `MockLlmService`: records requests, returns deterministic responses
//! - `MockLlmBehavior`: controls outcome and scripted completion text

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, RwLock,
};

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

/// What outcome the mock should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockLlmOutcome {
    /// Return a completion (scripted text, or an echo of the last message)
    #[default]
    Complete,
    /// Fail with a request error
    Fail,
}

/// Programmable behavior for the mock LLM service
#[derive(Debug, Clone, Default)]
pub struct MockLlmBehavior {
    pub outcome: Arc<RwLock<MockLlmOutcome>>,
    pub scripted_response: Arc<RwLock<Option<String>>>,
}

impl MockLlmBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock outcome
    pub fn set_outcome(&self, outcome: MockLlmOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    /// Configure the completion text returned on success
    pub fn set_response(&self, text: impl Into<String>) {
        *self.scripted_response.write().unwrap() = Some(text.into());
    }

    /// Reset to default behavior
    pub fn reset(&self) {
        *self.outcome.write().unwrap() = MockLlmOutcome::Complete;
        *self.scripted_response.write().unwrap() = None;
    }

    pub fn get_outcome(&self) -> MockLlmOutcome {
        self.outcome.read().unwrap().clone()
    }
}

/// Mock LLM service with programmable behavior and request recording
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    behavior: Arc<MockLlmBehavior>,
    history: Arc<Mutex<Vec<CompletionRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: Arc<MockLlmBehavior>) -> Self {
        Self {
            behavior,
            history: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the shared behavior for external configuration
    pub fn behavior(&self) -> &Arc<MockLlmBehavior> {
        &self.behavior
    }

    /// Get recorded completion requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.history.lock().unwrap().clone()
    }

    /// Number of completion calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!("Mock LLM service processing completion request");

        self.calls.fetch_add(1, Ordering::SeqCst);
        self.history.lock().unwrap().push(request.clone());

        if self.behavior.get_outcome() == MockLlmOutcome::Fail {
            return Err(LlmError::Request("Mock LLM failure".to_string()));
        }

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model
        };

        // Scripted text wins; otherwise echo the last user message
        let scripted = self.behavior.scripted_response.read().unwrap().clone();
        let content = scripted.unwrap_or_else(|| {
            let last_message = request
                .messages
                .last()
                .map(|m| m.content.as_str())
                .unwrap_or("empty");
            format!("Mock response to: {}", last_message)
        });

        let input_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as i32 / 4)
            .sum::<i32>();
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content,
            model,
            input_tokens,
            output_tokens,
            stop_reason: "STOP".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
