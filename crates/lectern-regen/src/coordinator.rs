//! Orchestration of one regeneration cycle

use crate::config::RegenConfig;
use crate::context::ContextWindowBuilder;
use crate::error::RegenError;
use crate::locks::{ArtifactLocks, LeaseGuard};
use lectern_domain::{
    dialogue_text, requires_audio, ArtifactId, ArtifactLease, AudioHandle, AudioSynthesizer,
    ContentGenerator, GeneratedContent, GenerationRecord, GenerationRequest, Metadata, NewRecord,
    QuotaLedger, QuotaReceipt, RegenerationScope, UnitDocument, UserId, VersionStore, VoiceMap,
};
use lectern_speech::{discard_all, synthesize_dialogue};
use lectern_voice::VoiceRecommendationEngine;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Metadata key prefix for audio handles of a unit (`audio.unit.<index>`)
pub const AUDIO_KEY_PREFIX: &str = "audio.unit.";

/// Metadata key holding the audio handles of the unit at `index`
pub fn audio_key(index: usize) -> String {
    format!("{}{}", AUDIO_KEY_PREFIX, index)
}

/// One regeneration request
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationRequest {
    /// User charged for the regeneration
    pub user_id: UserId,
    /// Artifact to regenerate
    pub artifact_id: ArtifactId,
    /// Whole artifact or a single unit
    pub scope: RegenerationScope,
    /// Free-text instruction
    pub custom_prompt: Option<String>,
    /// Voices to use verbatim instead of a recommendation
    pub voice_config: Option<VoiceMap>,
    /// Metadata merged over the active version's metadata
    pub metadata: Metadata,
}

impl RegenerationRequest {
    /// Create a request with no prompt, voice override or metadata
    pub fn new(user_id: UserId, artifact_id: ArtifactId, scope: RegenerationScope) -> Self {
        Self {
            user_id,
            artifact_id,
            scope,
            custom_prompt: None,
            voice_config: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the instruction
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    /// Override the voice configuration
    pub fn with_voice_config(mut self, voices: VoiceMap) -> Self {
        self.voice_config = Some(voices);
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Stage of a regeneration cycle, for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Locked,
    Generating,
    Merging,
    Committing,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CycleState::Locked => "locked",
            CycleState::Generating => "generating",
            CycleState::Merging => "merging",
            CycleState::Committing => "committing",
        })
    }
}

/// Entry point for listing, regenerating and selecting artifact versions
///
/// `regenerate` holds a per-artifact lock for the whole cycle and fails fast
/// with [`RegenError::Busy`] when another cycle is in flight, in this process
/// or in any other process sharing the store's lease table. The version
/// store is shared behind a mutex that is only taken for individual reads and
/// writes, never across collaborator calls.
pub struct RegenerationCoordinator<S, G, A, Q> {
    store: Arc<Mutex<S>>,
    generator: G,
    synthesizer: A,
    quota: Mutex<Q>,
    voices: VoiceRecommendationEngine,
    locks: ArtifactLocks,
}

impl<S, G, A, Q> RegenerationCoordinator<S, G, A, Q>
where
    S: VersionStore + ArtifactLease,
    G: ContentGenerator,
    A: AudioSynthesizer,
    Q: QuotaLedger,
{
    /// Create a coordinator owning its store
    pub fn new(
        store: S,
        generator: G,
        synthesizer: A,
        quota: Q,
        config: RegenConfig,
    ) -> Result<Self, RegenError> {
        Self::with_shared_store(Arc::new(Mutex::new(store)), generator, synthesizer, quota, config)
    }

    /// Create a coordinator over a store shared with other components
    pub fn with_shared_store(
        store: Arc<Mutex<S>>,
        generator: G,
        synthesizer: A,
        quota: Q,
        config: RegenConfig,
    ) -> Result<Self, RegenError> {
        config.validate().map_err(RegenError::Config)?;
        let voices =
            VoiceRecommendationEngine::new(config.voice).map_err(|e| RegenError::Config(e.to_string()))?;

        Ok(Self {
            store,
            generator,
            synthesizer,
            quota: Mutex::new(quota),
            voices,
            locks: ArtifactLocks::new(),
        })
    }

    /// Handle to the shared version store
    pub fn shared_store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Whether this coordinator has a regeneration of `artifact_id` in flight
    pub fn is_busy(&self, artifact_id: ArtifactId) -> bool {
        self.locks.is_locked(artifact_id)
    }

    /// All versions of an artifact, oldest first
    pub fn list_history(&self, artifact_id: ArtifactId) -> Result<Vec<GenerationRecord>, RegenError> {
        Ok(self.store().list_versions(artifact_id)?)
    }

    /// Make an existing version the active one
    ///
    /// Does not take the regeneration lock and consumes no quota. If a
    /// regeneration of the same artifact commits concurrently, whichever
    /// write lands last decides the active version.
    pub fn select_version(
        &self,
        artifact_id: ArtifactId,
        version: u32,
    ) -> Result<GenerationRecord, RegenError> {
        let record = self.store().activate(artifact_id, version)?;
        info!(artifact = %artifact_id, version, "Selected version");
        Ok(record)
    }

    /// Run one regeneration cycle and commit the result as a new version
    ///
    /// Consumes one quota unit, refunded if the cycle fails. On any failure
    /// nothing is committed and the active version is unchanged.
    pub fn regenerate(&self, request: RegenerationRequest) -> Result<GenerationRecord, RegenError> {
        let artifact_id = request.artifact_id;
        let _guard = self
            .locks
            .try_acquire(artifact_id)
            .ok_or(RegenError::Busy { artifact_id })?;
        let _lease = self.claim_lease(artifact_id)?;
        trace_state(artifact_id, CycleState::Locked);

        let active = self.store().get_active(artifact_id)?;
        if let RegenerationScope::Unit(index) = request.scope {
            let unit_count = match &active {
                Some(record) => record.unit_count(),
                None => {
                    return Err(RegenError::NotFound(format!(
                        "artifact {} has no versions",
                        artifact_id
                    )))
                }
            };
            if index >= unit_count {
                return Err(RegenError::NotFound(format!(
                    "unit {} of artifact {} (content has {} units)",
                    index, artifact_id, unit_count
                )));
            }
        }

        let receipt = self.quota().consume_one(request.user_id)?;
        debug!(user = %request.user_id, source = ?receipt.source, "Quota consumed");

        match self.run_cycle(&request, active.as_ref()) {
            Ok(record) => {
                info!(
                    artifact = %artifact_id,
                    version = record.version,
                    scope = %request.scope,
                    units = record.unit_count(),
                    "Regeneration committed"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(artifact = %artifact_id, error = %e, "Regeneration failed");
                self.refund(&receipt);
                Err(e)
            }
        }
    }

    fn run_cycle(
        &self,
        request: &RegenerationRequest,
        active: Option<&GenerationRecord>,
    ) -> Result<GenerationRecord, RegenError> {
        let artifact_id = request.artifact_id;
        let current: &[UnitDocument] = active.map(|r| r.content.as_slice()).unwrap_or(&[]);
        let context = ContextWindowBuilder::new(&*self.store()).build_context(artifact_id)?;

        let mut metadata = active.map(|r| r.metadata.clone()).unwrap_or_default();
        match request.scope {
            RegenerationScope::WholeArtifact => {
                metadata.retain(|key, _| !key.starts_with(AUDIO_KEY_PREFIX))
            }
            RegenerationScope::Unit(index) => {
                metadata.remove(&audio_key(index));
            }
        }
        metadata.extend(request.metadata.clone());

        let mut voices = self.initial_voices(request, current, active);

        trace_state(artifact_id, CycleState::Generating);
        let generation = GenerationRequest {
            scope: request.scope,
            custom_prompt: request.custom_prompt.as_deref(),
            context: &context,
            current,
            metadata: &metadata,
        };
        let generated = self.generator.generate(&generation)?;

        trace_state(artifact_id, CycleState::Merging);
        let (content, updated) = splice(request.scope, current, generated)?;
        for &index in &updated {
            content[index].validate().map_err(|e| {
                RegenError::GenerationFailed(format!("unit {} is invalid: {}", index, e))
            })?;
        }

        let spoken: Vec<(usize, &str)> = updated
            .iter()
            .filter_map(|&i| content[i].spoken_text().map(|text| (i, text)))
            .collect();
        let mut produced: Vec<AudioHandle> = Vec::new();
        if !spoken.is_empty() {
            let voice_map = voices.get_or_insert_with(VoiceMap::new);
            if request.voice_config.is_none() {
                let dialogue = dialogue_text(updated.iter().map(|&i| &content[i]));
                add_missing_voices(voice_map, &self.voices.recommend(&dialogue).voice_map);
            }
            for (index, script) in spoken {
                let handles = match synthesize_dialogue(&self.synthesizer, script, voice_map) {
                    Ok(handles) => handles,
                    Err(e) => {
                        self.discard_audio(&produced);
                        return Err(e.into());
                    }
                };
                let ids: Vec<&str> = handles.iter().map(|h| h.as_str()).collect();
                metadata.insert(audio_key(index), ids.join(","));
                produced.extend(handles);
            }
        }

        trace_state(artifact_id, CycleState::Committing);
        let record = NewRecord {
            voice_config: voices.filter(|_| requires_audio(&content)),
            content,
            prompt: request
                .custom_prompt
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            context_snapshot: Some(context).filter(|c| !c.is_empty()),
            metadata,
        };
        let appended = self.store().append(artifact_id, record);
        appended.map_err(|e| {
            self.discard_audio(&produced);
            e.into()
        })
    }

    /// Voices known before generation
    ///
    /// The override wins and is used verbatim. Otherwise voices are
    /// recommended from the dialogue being replaced, or a unit regeneration
    /// without dialogue keeps the active version's voices. Speakers that only
    /// appear in the new dialogue are added after generation.
    fn initial_voices(
        &self,
        request: &RegenerationRequest,
        current: &[UnitDocument],
        active: Option<&GenerationRecord>,
    ) -> Option<VoiceMap> {
        if let Some(voices) = &request.voice_config {
            return Some(voices.clone());
        }

        let relevant = match request.scope {
            RegenerationScope::WholeArtifact => current,
            RegenerationScope::Unit(index) => current.get(index..=index).unwrap_or(&[]),
        };
        if requires_audio(relevant) {
            let recommendation = self.voices.recommend(&dialogue_text(relevant));
            debug!(
                preset = %recommendation.preset_name,
                confidence = recommendation.confidence,
                "Recommended voices"
            );
            return Some(recommendation.voice_map);
        }

        match request.scope {
            RegenerationScope::Unit(_) => active.and_then(|r| r.voice_config.clone()),
            RegenerationScope::WholeArtifact => None,
        }
    }

    fn claim_lease(&self, artifact_id: ArtifactId) -> Result<LeaseGuard<'_, S>, RegenError> {
        let token = self.store().try_claim(artifact_id)?;
        match token {
            Some(token) => Ok(LeaseGuard::new(&self.store, artifact_id, token)),
            None => {
                debug!(artifact = %artifact_id, "Artifact leased by another process");
                Err(RegenError::Busy { artifact_id })
            }
        }
    }

    fn discard_audio(&self, handles: &[AudioHandle]) {
        if !handles.is_empty() {
            debug!(count = handles.len(), "Discarding audio of failed cycle");
            discard_all(&self.synthesizer, handles);
        }
    }

    fn refund(&self, receipt: &QuotaReceipt) {
        if let Err(e) = self.quota().refund(receipt) {
            warn!(user = %receipt.user_id, error = %e, "Quota refund failed");
        }
    }

    fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn quota(&self) -> MutexGuard<'_, Q> {
        self.quota.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// New content plus the positions that changed
///
/// A unit replacement copies every other unit of the active content verbatim.
fn splice(
    scope: RegenerationScope,
    current: &[UnitDocument],
    generated: GeneratedContent,
) -> Result<(Vec<UnitDocument>, Vec<usize>), RegenError> {
    match (scope, generated) {
        (RegenerationScope::WholeArtifact, GeneratedContent::Whole(units)) => {
            if units.is_empty() {
                return Err(RegenError::GenerationFailed(
                    "generator returned no units".to_string(),
                ));
            }
            let updated = (0..units.len()).collect();
            Ok((units, updated))
        }
        (RegenerationScope::Unit(index), GeneratedContent::Unit(unit)) => {
            let mut content = current.to_vec();
            let slot = content.get_mut(index).ok_or_else(|| {
                RegenError::NotFound(format!("unit {} (content has {} units)", index, current.len()))
            })?;
            *slot = unit;
            Ok((content, vec![index]))
        }
        (scope, _) => Err(RegenError::GenerationFailed(format!(
            "generator returned the wrong shape of content for {}",
            scope
        ))),
    }
}

/// Give every role of `recommended` that `voices` lacks its recommended voice
fn add_missing_voices(voices: &mut VoiceMap, recommended: &VoiceMap) {
    for (role, voice) in recommended.iter() {
        if !voices.contains_role(role) {
            voices.insert(role, voice);
        }
    }
}

fn trace_state(artifact_id: ArtifactId, state: CycleState) {
    debug!(artifact = %artifact_id, %state, "Regeneration state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::{ChoiceQuestion, ListeningQuestion};

    fn choice(stem: &str) -> UnitDocument {
        UnitDocument::Choice(ChoiceQuestion {
            question: stem.to_string(),
            options: vec!["A. yes".to_string(), "B. no".to_string()],
            answer: "A".to_string(),
            explanation: String::new(),
        })
    }

    fn listening(script: &str) -> UnitDocument {
        UnitDocument::Listening(ListeningQuestion {
            script: script.to_string(),
            question: "Who speaks first?".to_string(),
            options: vec!["A. M".to_string(), "B. W".to_string()],
            answer: "A".to_string(),
            explanation: String::new(),
        })
    }

    #[test]
    fn test_splice_replaces_only_target() {
        let current = vec![choice("one"), choice("two"), choice("three")];
        let (content, updated) = splice(
            RegenerationScope::Unit(1),
            &current,
            GeneratedContent::Unit(listening("M: hi")),
        )
        .unwrap();

        assert_eq!(updated, vec![1]);
        assert_eq!(content.len(), 3);
        assert_eq!(content[0], current[0]);
        assert_eq!(content[1], listening("M: hi"));
        assert_eq!(content[2], current[2]);
    }

    #[test]
    fn test_splice_whole_marks_every_unit() {
        let (content, updated) = splice(
            RegenerationScope::WholeArtifact,
            &[choice("old")],
            GeneratedContent::Whole(vec![choice("a"), choice("b")]),
        )
        .unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(updated, vec![0, 1]);
    }

    #[test]
    fn test_splice_rejects_wrong_shape_and_empty() {
        assert!(matches!(
            splice(
                RegenerationScope::Unit(0),
                &[choice("a")],
                GeneratedContent::Whole(vec![choice("b")])
            ),
            Err(RegenError::GenerationFailed(_))
        ));
        assert!(matches!(
            splice(RegenerationScope::WholeArtifact, &[], GeneratedContent::Whole(vec![])),
            Err(RegenError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_add_missing_voices_keeps_existing_roles() {
        let mut voices = VoiceMap::new().with("M", "old-male").with("W", "old-female");
        let recommended = VoiceMap::new()
            .with("M", "new-male")
            .with("A", "new-male")
            .with("B", "new-female");

        add_missing_voices(&mut voices, &recommended);

        assert_eq!(voices.voice_for("M"), Some("old-male"));
        assert_eq!(voices.voice_for("A"), Some("new-male"));
        assert_eq!(voices.voice_for("B"), Some("new-female"));
        assert_eq!(voices.len(), 4);
    }

    #[test]
    fn test_audio_key() {
        assert_eq!(audio_key(3), "audio.unit.3");
        assert!(audio_key(0).starts_with(AUDIO_KEY_PREFIX));
    }

    #[test]
    fn test_request_builder() {
        let request = RegenerationRequest::new(
            UserId::new(1),
            ArtifactId::new(2),
            RegenerationScope::WholeArtifact,
        )
        .with_prompt("simplify")
        .with_metadata("topic", "Food");

        assert_eq!(request.custom_prompt.as_deref(), Some("simplify"));
        assert_eq!(request.metadata.get("topic").map(String::as_str), Some("Food"));
        assert!(request.voice_config.is_none());
    }
}
