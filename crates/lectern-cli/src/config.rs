//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use lectern_generator::GeneratorConfig;
use lectern_janitor::JanitorConfig;
use lectern_llm::LlmConfig;
use lectern_regen::RegenConfig;
use lectern_speech::SpeechConfig;
use lectern_store::QuotaConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, one section per component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database location
    pub store: StoreSettings,

    /// LLM provider
    pub llm: LlmConfig,

    /// Speech synthesis
    pub speech: SpeechConfig,

    /// Content generation
    pub generator: GeneratorConfig,

    /// Quota ledger
    pub quota: QuotaConfig,

    /// Janitor worker
    pub janitor: JanitorConfig,

    /// Regeneration coordinator
    pub regen: RegenConfig,

    /// Output settings
    pub settings: Settings,
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite database file shared by versions, quotas and leases
    pub path: PathBuf,

    /// Minutes after which an unreleased regeneration lease is abandoned
    pub lease_ttl_minutes: u64,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the default configuration and database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".lectern"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.generator.validate().map_err(CliError::Config)?;
        self.janitor.validate().map_err(CliError::Config)?;
        self.regen.validate().map_err(CliError::Config)?;
        if self.store.lease_ttl_minutes == 0 {
            return Err(CliError::Config("store.lease_ttl_minutes must be at least 1".into()));
        }
        if self.quota.free_daily_limit == 0 {
            tracing::warn!("free_daily_limit is 0; only credits and subscriptions allow regeneration");
        }
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        let path = Config::home()
            .map(|home| home.join("lectern.db"))
            .unwrap_or_else(|_| PathBuf::from("lectern.db"));
        Self {
            path,
            lease_ttl_minutes: 15,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.quota.free_daily_limit, 10);
        assert!(config.store.path.ends_with("lectern.db"));
        assert_eq!(config.store.lease_ttl_minutes, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[store]
path = "/tmp/homework.db"

[quota]
free_daily_limit = 3

[janitor]
dry_run = true

[settings]
format = "json"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store.path, PathBuf::from("/tmp/homework.db"));
        assert_eq!(config.quota.free_daily_limit, 3);
        assert!(config.janitor.dry_run);
        assert_eq!(config.janitor.sweep_interval_minutes, 60);
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn test_invalid_section_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[generator]\ndefault_difficulty = \"extreme\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_zero_lease_ttl_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[store]\nlease_ttl_minutes = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.speech.binary = "/opt/edge-tts".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.speech.binary, "/opt/edge-tts");
    }
}
