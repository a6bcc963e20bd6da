//! Error types for the content generator

use lectern_domain::GenerationError;
use thiserror::Error;

/// Errors that can occur during generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The homework brief in the request metadata is missing or invalid
    #[error("Invalid homework brief: {0}")]
    InvalidBrief(String),

    /// Response did not have the expected shape
    #[error("Invalid unit format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        GeneratorError::JsonParse(e.to_string())
    }
}

impl From<GeneratorError> for GenerationError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::Llm(_) | GeneratorError::InvalidBrief(_) | GeneratorError::Config(_) => {
                GenerationError::Failed(e.to_string())
            }
            GeneratorError::InvalidFormat(_) | GeneratorError::JsonParse(_) => {
                GenerationError::InvalidContent(e.to_string())
            }
        }
    }
}
