//! Errors surfaced by the regeneration API

use lectern_domain::{
    ArtifactId, GenerationError, QuotaError, SynthesisError, UserId, VersionStoreError,
};
use thiserror::Error;

/// Errors returned by [`RegenerationCoordinator`](crate::RegenerationCoordinator)
///
/// Collaborator failures are passed through without retry. Only `Busy` is
/// retryable; everything else is a hard failure for the request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegenError {
    /// Another regeneration of the artifact is in flight
    #[error("Artifact {artifact_id} is already being regenerated")]
    Busy {
        /// Locked artifact
        artifact_id: ArtifactId,
    },

    /// Artifact, version or unit does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user's quota denied the request
    #[error("Quota exceeded for user {user_id}: {reason}")]
    QuotaExceeded {
        /// User that was charged
        user_id: UserId,
        /// Ledger explanation
        reason: String,
    },

    /// The content generator failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The audio synthesizer failed
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// The version store detected a version collision
    #[error("Version {version} of artifact {artifact_id} already exists")]
    Conflict {
        /// Artifact being appended to
        artifact_id: ArtifactId,
        /// Version that collided
        version: u32,
    },

    /// Version store backend failure
    #[error("Store error: {0}")]
    Store(String),

    /// Quota ledger backend failure
    #[error("Quota ledger error: {0}")]
    Quota(String),

    /// Invalid coordinator configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RegenError {
    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegenError::Busy { .. })
    }
}

impl From<VersionStoreError> for RegenError {
    fn from(e: VersionStoreError) -> Self {
        match e {
            VersionStoreError::NotFound { .. } => RegenError::NotFound(e.to_string()),
            VersionStoreError::Conflict {
                artifact_id,
                version,
            } => RegenError::Conflict {
                artifact_id,
                version,
            },
            VersionStoreError::InvalidData(_) | VersionStoreError::Backend(_) => {
                RegenError::Store(e.to_string())
            }
        }
    }
}

impl From<QuotaError> for RegenError {
    fn from(e: QuotaError) -> Self {
        match e {
            QuotaError::Exceeded { user_id, reason } => RegenError::QuotaExceeded { user_id, reason },
            QuotaError::Backend(msg) => RegenError::Quota(msg),
        }
    }
}

impl From<GenerationError> for RegenError {
    fn from(e: GenerationError) -> Self {
        RegenError::GenerationFailed(e.to_string())
    }
}

impl From<SynthesisError> for RegenError {
    fn from(e: SynthesisError) -> Self {
        RegenError::SynthesisFailed(e.to_string())
    }
}
