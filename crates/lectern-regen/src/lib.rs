//! Lectern Regeneration Engine
//!
//! Versioned, lock-protected regeneration of generated artifacts.
//!
//! # Overview
//!
//! A regeneration replaces either the whole content of an artifact or one of
//! its units, and commits the result as the next version. Each cycle:
//!
//! ```text
//! lock → active version → quota → context → voices → generate → merge
//!      → synthesize → append → unlock
//! ```
//!
//! - **ContextWindowBuilder**: the five most recent versions rendered as
//!   prompt context
//! - **ArtifactLocks**: non-blocking, per-artifact exclusivity
//! - **RegenerationCoordinator**: `list_history`, `regenerate` and
//!   `select_version`, the only entry points for the surrounding application
//!
//! # Example Usage
//!
//! ```no_run
//! use lectern_domain::{ArtifactId, RegenerationScope, UserId};
//! use lectern_generator::{GeneratorConfig, LlmContentGenerator};
//! use lectern_llm::MockProvider;
//! use lectern_regen::{RegenConfig, RegenerationCoordinator, RegenerationRequest};
//! use lectern_speech::MockSynthesizer;
//! use lectern_store::{QuotaConfig, SqliteQuotaLedger, SqliteStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("lectern.db")?;
//! let quota = SqliteQuotaLedger::new("lectern.db", QuotaConfig::default())?;
//! let generator = LlmContentGenerator::new(MockProvider::default(), GeneratorConfig::default())?;
//!
//! let coordinator = RegenerationCoordinator::new(
//!     store,
//!     generator,
//!     MockSynthesizer::new(),
//!     quota,
//!     RegenConfig::default(),
//! )?;
//!
//! let request = RegenerationRequest::new(UserId::new(1), ArtifactId::new(42), RegenerationScope::Unit(0))
//!     .with_prompt("simplify");
//! match coordinator.regenerate(request) {
//!     Ok(record) => println!("version {}", record.version),
//!     Err(e) if e.is_retryable() => println!("busy, try again"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod context;
mod coordinator;
mod error;
mod locks;

pub use config::{RegenConfig, CONTEXT_WINDOW};
pub use context::{render_block, ContextWindowBuilder, RECORD_DELIMITER};
pub use coordinator::{audio_key, RegenerationCoordinator, RegenerationRequest, AUDIO_KEY_PREFIX};
pub use error::RegenError;
pub use locks::{ArtifactLockGuard, ArtifactLocks};
