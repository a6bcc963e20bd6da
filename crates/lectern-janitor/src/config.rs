//! Configuration for Janitor operations
//!
//! Defines the sweep interval and operational mode.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use lectern_janitor::JanitorConfig;
///
/// // Default configuration (hourly sweeps)
/// let config = JanitorConfig::default();
/// assert_eq!(config.sweep_interval_minutes, 60);
///
/// // Frequent sweeps
/// let config = JanitorConfig::frequent();
/// assert_eq!(config.sweep_interval_minutes, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    /// How often to run the sweep cycle (in minutes)
    ///
    /// A sweep is cheap and idempotent within a day, so the interval only
    /// bounds how long after midnight (UTC) allowances are reset eagerly.
    /// Default: 60
    pub sweep_interval_minutes: u64,

    /// Dry-run mode: count allowances due for reset without resetting them
    /// Default: false
    pub dry_run: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_minutes: 60,
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    /// Sweep every five minutes
    pub fn frequent() -> Self {
        Self {
            sweep_interval_minutes: 5,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_minutes == 0 {
            return Err("sweep_interval_minutes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JanitorConfig::default();
        assert_eq!(config.sweep_interval_minutes, 60);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = JanitorConfig {
            sweep_interval_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: JanitorConfig = serde_json::from_str(r#"{"dry_run": true}"#).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.sweep_interval_minutes, 60);
    }
}
