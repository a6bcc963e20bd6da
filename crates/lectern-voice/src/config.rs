//! Recommendation engine configuration

use crate::VoiceError;
use serde::{Deserialize, Serialize};

/// Tuning for confidence scores
///
/// Confidence for `n` matched keywords is `n / (n + match_baseline)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Pseudo-count added to the match count; larger values need more
    /// keywords before confidence approaches 1.0
    pub match_baseline: f64,

    /// Confidence reported when no scenario matched
    pub fallback_confidence: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            match_baseline: 2.0,
            fallback_confidence: 0.1,
        }
    }
}

impl RecommendationConfig {
    /// Check the values are usable
    pub fn validate(&self) -> Result<(), VoiceError> {
        if !(self.match_baseline > 0.0 && self.match_baseline.is_finite()) {
            return Err(VoiceError::Config(format!(
                "match_baseline must be positive, got {}",
                self.match_baseline
            )));
        }
        if !(0.0..=1.0).contains(&self.fallback_confidence) {
            return Err(VoiceError::Config(format!(
                "fallback_confidence must be within [0, 1], got {}",
                self.fallback_confidence
            )));
        }
        Ok(())
    }

    /// Confidence for a number of matched keywords, clamped to `[0, 1]`
    pub fn confidence_for(&self, matches: usize) -> f64 {
        if matches == 0 {
            return self.fallback_confidence;
        }
        let n = matches as f64;
        (n / (n + self.match_baseline)).clamp(0.0, 1.0)
    }
}
