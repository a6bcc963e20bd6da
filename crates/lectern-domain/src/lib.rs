//! Lectern Domain Layer
//!
//! Core types and trait seams for the generation versioning and regeneration
//! engine. Every other crate depends on this one; it depends on nothing but
//! `serde` and `thiserror`.
//!
//! ## Key Concepts
//!
//! - **Artifact**: a generated exercise set that accumulates versions over time
//! - **Unit**: one independently addressable question inside an artifact
//! - **GenerationRecord**: one immutable version of an artifact's content
//! - **Active version**: the single record currently presented for an artifact
//! - **VoiceMap**: speaker role label → text-to-speech voice identifier
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Infrastructure (SQLite, LLM, TTS) lives in other crates
//! - Trait definitions for every external collaborator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod error;
pub mod record;
pub mod scope;
pub mod traits;
pub mod unit;
pub mod voice;

// Re-exports for convenience
pub use artifact::{ArtifactId, UserId};
pub use error::{GenerationError, QuotaError, SynthesisError, VersionStoreError};
pub use record::{GenerationRecord, Metadata, NewRecord};
pub use scope::RegenerationScope;
pub use unit::{
    ChoiceQuestion, EssayPrompt, FillBlankQuestion, ListeningQuestion, ReadingPassage,
    TrueFalseQuestion, UnitDocument, UnitKind, dialogue_text, requires_audio,
};
pub use traits::{
    ArtifactLease, AudioHandle, AudioSynthesizer, ContentGenerator, GeneratedContent,
    GenerationRequest, LeaseToken, QuotaLedger, QuotaMaintenance, QuotaReceipt, QuotaSource, VersionStore,
};
pub use voice::VoiceMap;
