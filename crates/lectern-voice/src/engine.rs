//! Keyword-driven voice recommendation

use crate::dialogue::{parse_dialogue, speakers, NARRATOR};
use crate::preset::{classify_speaker, default_preset, ScenarioPreset, SpeakerRole, PRESETS};
use crate::{RecommendationConfig, VoiceError};
use lectern_domain::VoiceMap;
use serde::Serialize;
use tracing::debug;

/// Recommended voice configuration for a dialogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceRecommendation {
    /// Name of the detected scenario preset
    pub preset_name: String,

    /// Role label to voice id, covering `M`, `W` and every speaker found
    pub voice_map: VoiceMap,

    /// Confidence in the scenario detection (0.0-1.0)
    pub confidence: f64,

    /// One-sentence explanation
    pub reasoning: String,

    /// Keywords that drove the decision
    pub matched_keywords: Vec<String>,
}

/// Stateless classifier from dialogue text to a voice configuration
///
/// # Examples
///
/// ```
/// use lectern_voice::VoiceRecommendationEngine;
///
/// let engine = VoiceRecommendationEngine::default();
/// let rec = engine.recommend("W: Doctor, I have a headache.\nM: Let me examine you.");
/// assert_eq!(rec.preset_name, "medical");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VoiceRecommendationEngine {
    config: RecommendationConfig,
}

impl VoiceRecommendationEngine {
    /// Create an engine with the given configuration
    pub fn new(config: RecommendationConfig) -> Result<Self, VoiceError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configuration
    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Recommend a voice configuration for a dialogue
    ///
    /// Counts keyword matches per preset, highest count wins and ties go to
    /// the earlier preset. Identical input always gives identical output.
    pub fn recommend(&self, dialogue_text: &str) -> VoiceRecommendation {
        let lower = dialogue_text.to_lowercase();

        let mut best: Option<(&'static ScenarioPreset, Vec<&'static str>)> = None;
        for preset in PRESETS.iter().filter(|p| !p.is_fallback()) {
            let matched = preset.matched_keywords(&lower);
            if matched.is_empty() {
                continue;
            }
            let better = best
                .as_ref()
                .is_none_or(|(_, current)| matched.len() > current.len());
            if better {
                best = Some((preset, matched));
            }
        }

        let (preset, matched) = best.unwrap_or((default_preset(), Vec::new()));
        let confidence = self.config.confidence_for(matched.len());
        let reasoning = if matched.is_empty() {
            format!(
                "No scenario detected in the dialogue; using the {} voices.",
                preset.name
            )
        } else {
            format!(
                "Detected a {} scenario from {} keyword(s): {}.",
                preset.name,
                matched.len(),
                matched.join(", ")
            )
        };

        debug!(
            preset = preset.name,
            matches = matched.len(),
            confidence,
            "Recommended voices"
        );

        VoiceRecommendation {
            preset_name: preset.name.to_string(),
            voice_map: voice_map_for(preset, dialogue_text),
            confidence,
            reasoning,
            matched_keywords: matched.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Canonical `M`/`W` voices plus one entry per speaker of the dialogue
///
/// Speakers whose gender cannot be read from the label alternate between the
/// male and female voice in order of appearance, so two anonymous speakers
/// (`A`, `B`) still sound different.
fn voice_map_for(preset: &ScenarioPreset, dialogue_text: &str) -> VoiceMap {
    let mut map = VoiceMap::new()
        .with("M", preset.male_voice)
        .with("W", preset.female_voice);

    let turns = parse_dialogue(dialogue_text);
    let mut next_unknown_is_male = true;
    for speaker in speakers(&turns) {
        let voice = match classify_speaker(speaker) {
            SpeakerRole::Male => preset.male_voice,
            SpeakerRole::Female => preset.female_voice,
            SpeakerRole::Narrator => preset.neutral_voice,
            SpeakerRole::Unknown => {
                let voice = if next_unknown_is_male {
                    preset.male_voice
                } else {
                    preset.female_voice
                };
                next_unknown_is_male = !next_unknown_is_male;
                voice
            }
        };
        if !map.contains_role(speaker) {
            map.insert(speaker, voice);
        }
    }

    if !map.contains_role(NARRATOR) {
        map.insert(NARRATOR, preset.neutral_voice);
    }
    map
}
