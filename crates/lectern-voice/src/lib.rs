//! Lectern Voice
//!
//! Recommends a coherent text-to-speech voice configuration from free-text
//! dialogue.
//!
//! The engine provides:
//! - Dialogue parsing into speaker turns
//! - Scenario detection against a declarative preset table
//! - A voice map covering the canonical `M`/`W` roles and every speaker found
//! - A confidence score and a one-sentence reasoning
//!
//! # Examples
//!
//! ```
//! use lectern_voice::VoiceRecommendationEngine;
//!
//! let engine = VoiceRecommendationEngine::default();
//! let rec = engine.recommend("M: How much is this shirt?\nW: Twenty dollars.");
//! assert_eq!(rec.preset_name, "shopping");
//! assert!(rec.voice_map.voice_for("M").is_some());
//! ```

#![warn(missing_docs)]

mod config;
mod dialogue;
mod engine;
mod error;
pub mod preset;

pub use config::RecommendationConfig;
pub use dialogue::{parse_dialogue, speakers, DialogueTurn, NARRATOR};
pub use engine::{VoiceRecommendation, VoiceRecommendationEngine};
pub use error::VoiceError;
pub use preset::{ScenarioPreset, PRESETS};
