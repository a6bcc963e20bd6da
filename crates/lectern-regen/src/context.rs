//! Bounded digest of recent history fed into the next generation

use crate::config::CONTEXT_WINDOW;
use lectern_domain::{ArtifactId, GenerationRecord, VersionStore, VersionStoreError};

/// Separator between version blocks
pub const RECORD_DELIMITER: &str = "\n---\n";

/// Renders the most recent versions of an artifact into generation context
///
/// Reads at most [`CONTEXT_WINDOW`] records and renders each as one block:
///
/// ```text
/// ### Version 3
/// Prompt: simplify the reading passage
/// Voices: M=en-US-GuyNeural, W=en-US-JennyNeural
/// ```
///
/// Blocks are joined oldest first with [`RECORD_DELIMITER`]. Whole records
/// beyond the window are dropped; a block is never cut short.
pub struct ContextWindowBuilder<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ContextWindowBuilder<'a, S>
where
    S: VersionStore + ?Sized,
{
    /// Create a builder reading from `store`
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Build the context for `artifact_id`; empty when it has no history
    pub fn build_context(&self, artifact_id: ArtifactId) -> Result<String, VersionStoreError> {
        let mut records = self.store.recent_versions(artifact_id, CONTEXT_WINDOW)?;
        records.sort_by_key(|r| r.version);
        let skip = records.len().saturating_sub(CONTEXT_WINDOW);

        Ok(records[skip..]
            .iter()
            .map(render_block)
            .collect::<Vec<_>>()
            .join(RECORD_DELIMITER))
    }
}

/// Render one record as a context block
pub fn render_block(record: &GenerationRecord) -> String {
    let prompt = record
        .prompt
        .as_deref()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .unwrap_or("(none)");

    let mut block = format!("### Version {}\nPrompt: {}", record.version, prompt);
    if let Some(voices) = record.voice_config.as_ref().filter(|v| !v.is_empty()) {
        block.push_str(&format!("\nVoices: {}", voices));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::{NewRecord, VoiceMap};
    use std::collections::BTreeMap;

    /// Minimal in-memory store for exercising the builder
    #[derive(Default)]
    struct MemoryStore {
        records: BTreeMap<ArtifactId, Vec<GenerationRecord>>,
    }

    impl VersionStore for MemoryStore {
        fn list_versions(&self, id: ArtifactId) -> Result<Vec<GenerationRecord>, VersionStoreError> {
            Ok(self.records.get(&id).cloned().unwrap_or_default())
        }

        fn recent_versions(
            &self,
            id: ArtifactId,
            limit: usize,
        ) -> Result<Vec<GenerationRecord>, VersionStoreError> {
            let all = self.list_versions(id)?;
            let skip = all.len().saturating_sub(limit);
            Ok(all[skip..].to_vec())
        }

        fn get_active(&self, id: ArtifactId) -> Result<Option<GenerationRecord>, VersionStoreError> {
            Ok(self.list_versions(id)?.into_iter().find(|r| r.is_active))
        }

        fn append(&mut self, id: ArtifactId, record: NewRecord) -> Result<GenerationRecord, VersionStoreError> {
            let versions = self.records.entry(id).or_default();
            versions.iter_mut().for_each(|r| r.is_active = false);
            let stored = GenerationRecord {
                artifact_id: id,
                version: versions.len() as u32 + 1,
                content: record.content,
                prompt: record.prompt,
                context_snapshot: record.context_snapshot,
                voice_config: record.voice_config,
                is_active: true,
                created_at: 0,
                metadata: record.metadata,
            };
            versions.push(stored.clone());
            Ok(stored)
        }

        fn activate(&mut self, id: ArtifactId, version: u32) -> Result<GenerationRecord, VersionStoreError> {
            Err(VersionStoreError::NotFound {
                artifact_id: id,
                version,
            })
        }
    }

    fn store_with(prompts: &[Option<&str>]) -> MemoryStore {
        let mut store = MemoryStore::default();
        for prompt in prompts {
            let mut record = NewRecord::new(vec![]);
            record.prompt = prompt.map(str::to_string);
            store.append(ArtifactId::new(1), record).unwrap();
        }
        store
    }

    #[test]
    fn test_no_history_is_empty() {
        let store = MemoryStore::default();
        let context = ContextWindowBuilder::new(&store)
            .build_context(ArtifactId::new(1))
            .unwrap();
        assert_eq!(context, "");
    }

    #[test]
    fn test_blocks_are_chronological() {
        let store = store_with(&[None, Some("simplify"), Some("  ")]);
        let context = ContextWindowBuilder::new(&store)
            .build_context(ArtifactId::new(1))
            .unwrap();

        assert_eq!(
            context,
            "### Version 1\nPrompt: (none)\n---\n### Version 2\nPrompt: simplify\n---\n### Version 3\nPrompt: (none)"
        );
    }

    #[test]
    fn test_window_keeps_newest_five() {
        let prompts: Vec<String> = (1..=8).map(|i| format!("edit {}", i)).collect();
        let refs: Vec<Option<&str>> = prompts.iter().map(|p| Some(p.as_str())).collect();
        let store = store_with(&refs);

        let context = ContextWindowBuilder::new(&store)
            .build_context(ArtifactId::new(1))
            .unwrap();
        let blocks: Vec<&str> = context.split(RECORD_DELIMITER).collect();

        assert_eq!(blocks.len(), CONTEXT_WINDOW);
        assert!(blocks[0].starts_with("### Version 4"));
        assert!(blocks[4].starts_with("### Version 8"));
        assert!(!context.contains("edit 3"));
    }

    #[test]
    fn test_block_renders_voices() {
        let mut store = MemoryStore::default();
        let record = NewRecord::new(vec![])
            .with_prompt("add a dialogue")
            .with_voice_config(VoiceMap::new().with("M", "en-US-GuyNeural").with("W", "en-US-JennyNeural"));
        store.append(ArtifactId::new(2), record).unwrap();

        let context = ContextWindowBuilder::new(&store)
            .build_context(ArtifactId::new(2))
            .unwrap();
        assert_eq!(
            context,
            "### Version 1\nPrompt: add a dialogue\nVoices: M=en-US-GuyNeural, W=en-US-JennyNeural"
        );
    }
}
