//! Core Janitor implementation for daily allowance resets

use crate::{JanitorConfig, JanitorError, JanitorMetrics};
use lectern_domain::QuotaMaintenance;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86_400;

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Janitor service for quota housekeeping
///
/// Free allowances are also refreshed lazily whenever a user consumes a
/// regeneration. The janitor resets every stale allowance eagerly so that
/// status queries and reports reflect the new day without waiting for
/// user activity.
///
/// # Examples
///
/// ```no_run
/// use lectern_janitor::{Janitor, JanitorConfig};
/// use lectern_store::{QuotaConfig, SqliteQuotaLedger};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ledger = SqliteQuotaLedger::new("lectern.db", QuotaConfig::default())?;
/// let mut janitor = Janitor::new(JanitorConfig::default())?;
///
/// let metrics = janitor.sweep(&mut ledger)?;
/// println!("{}", metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    metrics: JanitorMetrics,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Result<Self, JanitorError> {
        config.validate().map_err(JanitorError::Config)?;
        Ok(Self {
            config,
            metrics: JanitorMetrics::new(),
        })
    }

    /// Get the active configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Perform a sweep for the current UTC day
    ///
    /// Returns the updated metrics after the sweep.
    pub fn sweep<Q: QuotaMaintenance>(&mut self, ledger: &mut Q) -> Result<JanitorMetrics, JanitorError> {
        self.sweep_at(ledger, current_timestamp())
    }

    /// Perform a sweep as if the current time were `now` (Unix seconds)
    pub fn sweep_at<Q: QuotaMaintenance>(
        &mut self,
        ledger: &mut Q,
        now: u64,
    ) -> Result<JanitorMetrics, JanitorError> {
        let start = Instant::now();
        let day = now / SECONDS_PER_DAY;

        let outcome = if self.config.dry_run {
            ledger.count_stale_allowances(day).map(|pending| {
                tracing::info!(day, pending, "Dry run: allowances due for reset");
                self.metrics.record_pending(pending);
            })
        } else {
            ledger.reset_daily_allowances(day).map(|reset| {
                if reset > 0 {
                    tracing::info!(day, reset, "Reset daily allowances");
                } else {
                    tracing::debug!(day, "No allowances due for reset");
                }
                self.metrics.record_reset(reset);
            })
        };

        self.metrics.total_runtime_ms += start.elapsed().as_millis() as u64;
        match outcome {
            Ok(()) => {
                self.metrics.record_sweep();
                Ok(self.metrics.clone())
            }
            Err(e) => {
                self.metrics.record_failure();
                Err(e.into())
            }
        }
    }
}
