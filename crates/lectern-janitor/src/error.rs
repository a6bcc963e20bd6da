//! Error types for Janitor operations

use thiserror::Error;

/// Errors that can occur during Janitor operations
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Quota ledger error
    #[error("Quota ledger error: {0}")]
    Ledger(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<lectern_domain::QuotaError> for JanitorError {
    fn from(e: lectern_domain::QuotaError) -> Self {
        JanitorError::Ledger(e.to_string())
    }
}
