//! Voice recommendation error types

use thiserror::Error;

/// Errors that can occur while configuring the recommendation engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoiceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
