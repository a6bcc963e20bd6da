//! Errors reported by the external collaborators
//!
//! Infrastructure crates convert their own failures into these so the
//! coordinator can surface one taxonomy regardless of backend.

use crate::{ArtifactId, UserId};
use thiserror::Error;

/// Errors from a version store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionStoreError {
    /// The requested version does not exist for the artifact
    #[error("Version {version} of artifact {artifact_id} not found")]
    NotFound {
        /// Artifact that was searched
        artifact_id: ArtifactId,
        /// Missing version
        version: u32,
    },

    /// A concurrent writer already created this version
    #[error("Version {version} of artifact {artifact_id} already exists")]
    Conflict {
        /// Artifact being appended to
        artifact_id: ArtifactId,
        /// Version that collided
        version: u32,
    },

    /// Stored data could not be decoded
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Backend failure (I/O, SQL, lock poisoning)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors from the content generator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The generator call itself failed
    #[error("Generation failed: {0}")]
    Failed(String),

    /// The generator returned content that does not fit the request
    #[error("Generated content invalid: {0}")]
    InvalidContent(String),
}

/// Errors from the audio synthesizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Synthesis failed
    #[error("Synthesis failed: {0}")]
    Failed(String),

    /// The voice identifier is not usable
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),
}

/// Errors from the quota ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaError {
    /// The user has no remaining allowance
    #[error("Quota exceeded for user {user_id}: {reason}")]
    Exceeded {
        /// User that ran out
        user_id: UserId,
        /// Human readable reason
        reason: String,
    },

    /// Backend failure
    #[error("Quota backend error: {0}")]
    Backend(String),
}
