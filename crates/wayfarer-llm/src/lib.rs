//! Wayfarer Oracle Providers
//!
//! Implementations of the `Oracle` trait from `wayfarer-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use wayfarer_llm::MockProvider;
//! use wayfarer_domain::traits::Oracle;
//!
//! let provider = MockProvider::new("Hello from the oracle!");
//! let result = provider.complete("test prompt").unwrap();
//! assert_eq!(result, "Hello from the oracle!");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use wayfarer_domain::traits::Oracle;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during oracle calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response envelope from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credentials rejected or missing
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Async runtime could not be created for a blocking call
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Scripted reply used by [`MockProvider`]
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<Scripted>,
    keyed: Vec<(String, Scripted)>,
    prompts: Vec<String>,
}

/// Mock oracle for deterministic testing
///
/// Replies are chosen in this order:
/// 1. the next scripted reply queued with [`push_response`](Self::push_response)
///    or [`push_error`](Self::push_error);
/// 2. the first keyed reply whose key occurs in the prompt;
/// 3. the default response.
///
/// Every prompt is recorded, so tests can assert on what the oracle was shown.
///
/// # Examples
///
/// ```
/// use wayfarer_llm::MockProvider;
/// use wayfarer_domain::traits::Oracle;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("Alaska", "alaska reply");
/// provider.push_response("first call");
///
/// assert_eq!(provider.complete("Alaska itinerary").unwrap(), "first call");
/// assert_eq!(provider.complete("Alaska itinerary").unwrap(), "alaska reply");
/// assert_eq!(provider.prompts().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reply with `response` whenever the prompt contains `key`
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        self.state()
            .keyed
            .push((key.into(), Scripted::Reply(response.into())));
    }

    /// Fail whenever the prompt contains `key`
    pub fn add_error(&mut self, key: impl Into<String>) {
        self.state()
            .keyed
            .push((key.into(), Scripted::Fail("Mock error".to_string())));
    }

    /// Queue a one-shot reply for the next call
    pub fn push_response(&self, response: impl Into<String>) {
        self.state().script.push_back(Scripted::Reply(response.into()));
    }

    /// Queue a one-shot failure for the next call
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().script.push_back(Scripted::Fail(message.into()));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl Oracle for MockProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        let reply = match state.script.pop_front() {
            Some(scripted) => scripted,
            None => state
                .keyed
                .iter()
                .find(|(key, _)| prompt.contains(key.as_str()))
                .map(|(_, scripted)| scripted.clone())
                .unwrap_or_else(|| Scripted::Reply(self.default_response.clone())),
        };

        match reply {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail(message) => Err(LlmError::Other(message)),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
