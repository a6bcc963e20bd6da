//! Configuration for the content generator

use serde::{Deserialize, Serialize};

/// Configuration for the content generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Ask the provider for JSON-mode output
    pub json_mode: bool,

    /// Upper bound for the count of any single question kind
    pub max_count_per_kind: u32,

    /// Difficulty used when the brief does not name one
    pub default_difficulty: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            json_mode: true,
            max_count_per_kind: 20,
            default_difficulty: "medium".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_count_per_kind == 0 {
            return Err("max_count_per_kind must be greater than 0".to_string());
        }
        if crate::brief::Difficulty::parse(&self.default_difficulty).is_none() {
            return Err(format!(
                "default_difficulty must be easy, medium or hard, got '{}'",
                self.default_difficulty
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
