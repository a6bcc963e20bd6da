//! Generation records - one immutable version of an artifact's content

use crate::{ArtifactId, UnitDocument, VoiceMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque auxiliary key/value data attached to a record
pub type Metadata = BTreeMap<String, String>;

/// One version of an artifact
///
/// Records are immutable once created: edits always produce a new record with
/// the next version. The only post-creation change is the `is_active` flag,
/// which the store moves atomically between records of the same artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Owning artifact
    pub artifact_id: ArtifactId,

    /// Version number, contiguous from 1 per artifact
    pub version: u32,

    /// Ordered unit documents
    pub content: Vec<UnitDocument>,

    /// Free-text instruction that produced this version
    pub prompt: Option<String>,

    /// Bounded history digest used as generation input
    pub context_snapshot: Option<String>,

    /// Voice assignment for spoken units
    pub voice_config: Option<VoiceMap>,

    /// Whether this is the artifact's current version
    pub is_active: bool,

    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,

    /// Auxiliary data, not interpreted by the store
    pub metadata: Metadata,
}

impl GenerationRecord {
    /// Number of units in the content
    pub fn unit_count(&self) -> usize {
        self.content.len()
    }
}

/// Input for appending a new version
///
/// The store assigns `version`, `is_active` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecord {
    /// Ordered unit documents
    pub content: Vec<UnitDocument>,
    /// Instruction that produced the content
    pub prompt: Option<String>,
    /// History digest used as input
    pub context_snapshot: Option<String>,
    /// Voice assignment for spoken units
    pub voice_config: Option<VoiceMap>,
    /// Auxiliary data
    pub metadata: Metadata,
}

impl NewRecord {
    /// Create a new record input with the given content
    pub fn new(content: Vec<UnitDocument>) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    /// Set the prompt
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the voice configuration
    pub fn with_voice_config(mut self, voice_config: VoiceMap) -> Self {
        self.voice_config = Some(voice_config);
        self
    }

    /// Set the context snapshot
    pub fn with_context_snapshot(mut self, snapshot: impl Into<String>) -> Self {
        self.context_snapshot = Some(snapshot.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
