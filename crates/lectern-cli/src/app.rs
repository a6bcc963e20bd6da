//! Wiring of the production components.

use crate::config::Config;
use crate::error::Result;
use lectern_generator::LlmContentGenerator;
use lectern_llm::OllamaProvider;
use lectern_regen::RegenerationCoordinator;
use lectern_speech::EdgeTtsSynthesizer;
use lectern_store::{SqliteQuotaLedger, SqliteStore};
use std::fs;
use std::time::Duration;

/// Coordinator over the SQLite store, Ollama and edge-tts.
pub type Coordinator = RegenerationCoordinator<
    SqliteStore,
    LlmContentGenerator<OllamaProvider>,
    EdgeTtsSynthesizer,
    SqliteQuotaLedger,
>;

/// Build the coordinator described by `config`.
///
/// Every CLI run builds its own coordinator; concurrent runs exclude each
/// other through the lease table in the shared database.
pub fn build_coordinator(config: &Config) -> Result<Coordinator> {
    ensure_parent(config)?;
    let store = SqliteStore::new(&config.store.path)?
        .with_lease_ttl(Duration::from_secs(config.store.lease_ttl_minutes * 60));
    let quota = open_ledger(config)?;
    let provider = OllamaProvider::from_config(&config.llm)?;
    let generator = LlmContentGenerator::new(provider, config.generator.clone())?;
    let synthesizer = EdgeTtsSynthesizer::new(config.speech.clone());

    tracing::debug!(db = %config.store.path.display(), model = %config.llm.model, "Coordinator ready");
    Ok(RegenerationCoordinator::new(
        store,
        generator,
        synthesizer,
        quota,
        config.regen,
    )?)
}

/// Open the quota ledger in the configured database.
pub fn open_ledger(config: &Config) -> Result<SqliteQuotaLedger> {
    ensure_parent(config)?;
    Ok(SqliteQuotaLedger::new(&config.store.path, config.quota)?)
}

fn ensure_parent(config: &Config) -> Result<()> {
    if let Some(parent) = config.store.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
