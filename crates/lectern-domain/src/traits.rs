//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the regeneration engine and
//! infrastructure. Implementations live in other crates.

use crate::{
    ArtifactId, GenerationError, GenerationRecord, Metadata, NewRecord, QuotaError,
    RegenerationScope, SynthesisError, UnitDocument, UserId, VersionStoreError,
};
use serde::{Deserialize, Serialize};

/// Durable append-only ledger of generation records
///
/// Implemented by the infrastructure layer (lectern-store)
pub trait VersionStore {
    /// All versions of an artifact, oldest first; empty for an unknown artifact
    fn list_versions(&self, artifact_id: ArtifactId)
        -> Result<Vec<GenerationRecord>, VersionStoreError>;

    /// The newest `limit` versions, in chronological order
    fn recent_versions(
        &self,
        artifact_id: ArtifactId,
        limit: usize,
    ) -> Result<Vec<GenerationRecord>, VersionStoreError>;

    /// The active version, if the artifact has any
    fn get_active(&self, artifact_id: ArtifactId)
        -> Result<Option<GenerationRecord>, VersionStoreError>;

    /// Append the next version and make it active
    ///
    /// Must be atomic: the version number is `max + 1` (or 1), the previous
    /// active record is deactivated and the new one inserted in one
    /// transaction. A version collision is reported as `Conflict`.
    fn append(
        &mut self,
        artifact_id: ArtifactId,
        record: NewRecord,
    ) -> Result<GenerationRecord, VersionStoreError>;

    /// Make an existing version the active one
    fn activate(
        &mut self,
        artifact_id: ArtifactId,
        version: u32,
    ) -> Result<GenerationRecord, VersionStoreError>;
}

/// Proof of a claim taken with [`ArtifactLease::try_claim`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeaseToken(pub String);

impl LeaseToken {
    /// Token as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Exclusive claim on an artifact, visible to every process sharing the backend
///
/// A claim that is never released expires after a backend-defined time so a
/// crashed holder cannot block an artifact forever.
pub trait ArtifactLease {
    /// Claim `artifact_id`; `None` while another holder's claim is live
    fn try_claim(&mut self, artifact_id: ArtifactId)
        -> Result<Option<LeaseToken>, VersionStoreError>;

    /// Release a claim. Releasing an expired or foreign claim is a no-op.
    fn release(
        &mut self,
        artifact_id: ArtifactId,
        token: &LeaseToken,
    ) -> Result<(), VersionStoreError>;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (lectern-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with structured output (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Input to one generator call
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// What to regenerate
    pub scope: RegenerationScope,
    /// Free-text instruction from the user
    pub custom_prompt: Option<&'a str>,
    /// History digest, possibly empty
    pub context: &'a str,
    /// Content of the active version (empty when there is none)
    pub current: &'a [UnitDocument],
    /// Pass-through metadata of the request
    pub metadata: &'a Metadata,
}

/// Output of one generator call
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    /// Replacement for the whole content
    Whole(Vec<UnitDocument>),
    /// Replacement for a single unit
    Unit(UnitDocument),
}

/// Produces new content for a regeneration
///
/// Implemented by the application layer (lectern-generator)
pub trait ContentGenerator {
    /// Generate content for the request's scope
    fn generate(&self, request: &GenerationRequest<'_>)
        -> Result<GeneratedContent, GenerationError>;
}

/// Opaque reference to synthesized audio
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioHandle(pub String);

impl AudioHandle {
    /// Handle as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Turns text into audio with a given voice
///
/// Implemented by the infrastructure layer (lectern-speech)
pub trait AudioSynthesizer {
    /// Synthesize `text` with `voice_id`
    fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioHandle, SynthesisError>;

    /// Drop audio that no committed record will reference
    ///
    /// Best effort; the default keeps nothing to drop.
    fn discard(&self, _handle: &AudioHandle) {}
}

/// Which allowance a consumed quota unit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaSource {
    /// Unlimited subscription; nothing was decremented
    Subscription,
    /// A purchased credit
    Purchased,
    /// The free daily allowance
    FreeDaily,
}

/// Proof that one quota unit was consumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaReceipt {
    /// User charged
    pub user_id: UserId,
    /// Allowance used
    pub source: QuotaSource,
    /// Consumption time (seconds since Unix epoch)
    pub consumed_at: u64,
}

/// Per-user usage allowance
///
/// Implemented by the infrastructure layer (lectern-store)
pub trait QuotaLedger {
    /// Consume one unit or fail with `QuotaError::Exceeded`
    fn consume_one(&mut self, user_id: UserId) -> Result<QuotaReceipt, QuotaError>;

    /// Give back a unit previously consumed
    fn refund(&mut self, receipt: &QuotaReceipt) -> Result<(), QuotaError>;
}

/// Scheduled maintenance of quota allowances
///
/// Implemented by the infrastructure layer (lectern-store), driven by
/// lectern-janitor.
pub trait QuotaMaintenance {
    /// Number of users whose free allowance was last reset before `day`
    fn count_stale_allowances(&self, day: u64) -> Result<usize, QuotaError>;

    /// Reset free allowances of every user not yet reset on `day`
    fn reset_daily_allowances(&mut self, day: u64) -> Result<usize, QuotaError>;
}
