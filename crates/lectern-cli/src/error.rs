//! Error types for the CLI application.

use lectern_regen::RegenError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code for a temporary failure the user should retry (EX_TEMPFAIL).
pub const EXIT_TEMPFAIL: i32 = 75;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Regeneration engine error
    #[error(transparent)]
    Regen(#[from] RegenError),

    /// Database error
    #[error("Store error: {0}")]
    Store(#[from] lectern_store::StoreError),

    /// Quota ledger error
    #[error(transparent)]
    Quota(#[from] lectern_domain::QuotaError),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] lectern_llm::LlmError),

    /// Content generator error
    #[error("Generator error: {0}")]
    Generator(#[from] lectern_generator::GeneratorError),

    /// Janitor error
    #[error(transparent)]
    Janitor(#[from] lectern_janitor::JanitorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Regen(e) if e.is_retryable() => EXIT_TEMPFAIL,
            _ => 1,
        }
    }
}
