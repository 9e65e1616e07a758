//! Best-effort prompt refinement
//!
//! Rewrites a free-text description into a more detailed generation prompt
//! with a single completion call. Refinement only ever improves or passes
//! through: every failure mode (no credential, transport error, malformed
//! or empty completion) yields the original text unchanged.

use std::sync::Arc;

use easel_llm::{CompletionRequest, LlmMessage, LlmRole, LlmService};

const SYSTEM_PROMPT: &str = "You rewrite user descriptions into detailed, high-quality \
image generation prompts. Keep the subject intact, add concrete visual detail. \
Respond with the rewritten prompt only, no commentary and no quotation marks.";

const MAX_REFINED_TOKENS: u32 = 256;

#[derive(Clone)]
pub struct PromptRefiner {
    llm: Arc<dyn LlmService>,
}

impl PromptRefiner {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// Refine a description. Never fails; the worst case is the original
    /// text passed through unchanged.
    pub async fn refine(&self, text: &str) -> String {
        let request = CompletionRequest {
            model: String::new(),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![LlmMessage {
                role: LlmRole::User,
                content: text.to_string(),
            }],
            max_tokens: Some(MAX_REFINED_TOKENS),
        };

        match self.llm.complete(request).await {
            Ok(response) => {
                let refined = sanitize(&response.content);
                if refined.is_empty() {
                    tracing::debug!("Refinement produced empty text, passing original through");
                    text.to_string()
                } else {
                    refined
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt refinement failed, passing original through");
                text.to_string()
            }
        }
    }
}

/// Trim whitespace and strip matching surrounding quote characters the
/// model tends to wrap its answer in.
fn sanitize(text: &str) -> String {
    let mut current = text.trim();
    loop {
        let stripped = strip_quotes(current).trim();
        if stripped == current {
            return current.to_string();
        }
        current = stripped;
    }
}

fn strip_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];

    for (open, close) in PAIRS {
        if text.len() >= 2 && text.starts_with(open) && text.ends_with(close) {
            let mut chars = text.chars();
            chars.next();
            chars.next_back();
            return chars.as_str();
        }
    }
    text
}
