//! Coordinator configuration

use lectern_voice::RecommendationConfig;
use serde::{Deserialize, Serialize};

/// Number of most recent versions rendered into the generation context
///
/// Older versions are dropped whole; this is not configurable.
pub const CONTEXT_WINDOW: usize = 5;

/// Configuration of the regeneration coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenConfig {
    /// Scoring of voice recommendations
    pub voice: RecommendationConfig,
}

impl RegenConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.voice.validate().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RegenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_section() {
        let config: RegenConfig = toml::from_str("[voice]\nmatch_baseline = 4.0\n").unwrap();
        assert_eq!(config.voice.match_baseline, 4.0);
        assert_eq!(config.voice.fallback_confidence, 0.1);

        let bad: RegenConfig = toml::from_str("[voice]\nmatch_baseline = 0.0\n").unwrap();
        assert!(bad.validate().is_err());
    }
}
