//! Lectern LLM Provider Layer
//!
//! Pluggable LLM provider implementations behind the `LlmProvider` trait from
//! `lectern-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use lectern_llm::MockProvider;
//! use lectern_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use lectern_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ollama::{LlmConfig, OllamaProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Default)]
struct MockState {
    exact: HashMap<String, Result<String, String>>,
    queue: VecDeque<Result<String, String>>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Answers are chosen in this order: a response registered for the exact
/// prompt, then the next queued response, then the default response. Every
/// prompt is recorded. Clones share state.
///
/// # Examples
///
/// ```
/// use lectern_llm::MockProvider;
/// use lectern_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.push_response("second");
/// assert_eq!(provider.generate("a").unwrap(), "first");
/// assert_eq!(provider.generate("b").unwrap(), "second");
/// assert_eq!(provider.generate("c").unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
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

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state().exact.insert(prompt.into(), Ok(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        self.state()
            .exact
            .insert(prompt.into(), Err("Mock error".to_string()));
    }

    /// Queue a response for the next unmatched prompt
    pub fn push_response(&self, response: impl Into<String>) {
        self.state().queue.push_back(Ok(response.into()));
    }

    /// Queue an error for the next unmatched prompt
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().queue.push_back(Err(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Most recent prompt
    pub fn last_prompt(&self) -> Option<String> {
        self.state().prompts.last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        let exact = state.exact.get(prompt).cloned();
        let answer = match exact {
            Some(answer) => answer,
            None => state
                .queue
                .pop_front()
                .unwrap_or_else(|| Ok(self.default_response.clone())),
        };
        answer.map_err(LlmError::Other)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_exact_match_does_not_consume_queue() {
        let provider = MockProvider::new("default");
        provider.add_response("exact", "matched");
        provider.push_response("queued");

        assert_eq!(provider.generate("exact").unwrap(), "matched");
        assert_eq!(provider.generate("other").unwrap(), "queued");
    }

    #[test]
    fn test_mock_provider_records_prompts() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt2"));
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.add_error("bad prompt");
        provider.push_error("queued failure");

        assert!(matches!(provider.generate("bad prompt"), Err(LlmError::Other(_))));
        assert!(matches!(provider.generate("next"), Err(LlmError::Other(m)) if m == "queued failure"));
    }

    #[test]
    fn test_clones_share_state() {
        let provider = MockProvider::default();
        let clone = provider.clone();
        clone.push_response("shared");
        assert_eq!(provider.generate("x").unwrap(), "shared");
        assert_eq!(clone.call_count(), 1);
    }
}
