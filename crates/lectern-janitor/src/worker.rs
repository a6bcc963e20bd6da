//! Background worker for continuous Janitor operation

use crate::{Janitor, JanitorConfig, JanitorError, JanitorMetrics};
use lectern_domain::QuotaMaintenance;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Background worker that runs Janitor on a schedule
///
/// # Examples
///
/// ```no_run
/// use lectern_janitor::{JanitorConfig, JanitorWorker};
/// use lectern_store::{QuotaConfig, SqliteQuotaLedger};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let ledger = SqliteQuotaLedger::new("lectern.db", QuotaConfig::default())?;
///     let mut worker = JanitorWorker::new(JanitorConfig::default())?;
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(ledger).await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker {
    janitor: Janitor,
    interval: Duration,
}

impl JanitorWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: JanitorConfig) -> Result<Self, JanitorError> {
        let interval = config.sweep_interval();
        Ok(Self {
            janitor: Janitor::new(config)?,
            interval,
        })
    }

    /// Override the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Result<Self, JanitorError> {
        if interval.is_zero() {
            return Err(JanitorError::Config("interval must be greater than 0".to_string()));
        }
        self.interval = interval;
        Ok(self)
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// A failed sweep is logged and retried on the next tick.
    pub async fn run<Q: QuotaMaintenance>(&mut self, mut ledger: Q) -> Result<(), JanitorError> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Janitor worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting sweep cycle");
                    match self.janitor.sweep(&mut ledger) {
                        Ok(metrics) => {
                            tracing::info!(
                                "Sweep completed: {} allowances reset so far",
                                metrics.allowances_reset
                            );
                        }
                        Err(e) => {
                            tracing::error!("Sweep failed: {}", e);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    break;
                }
            }
        }

        tracing::info!("Janitor stopped. Final metrics:\n{}", self.janitor.metrics().summary());
        Ok(())
    }

    /// Run for a specific number of cycles, stopping at the first failure
    pub async fn run_cycles<Q: QuotaMaintenance>(
        &mut self,
        mut ledger: Q,
        cycles: usize,
    ) -> Result<(), JanitorError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);

            if let Err(e) = self.janitor.sweep(&mut ledger) {
                tracing::error!("Sweep {}/{} failed: {}", cycle + 1, cycles, e);
                return Err(e);
            }
        }

        tracing::info!(
            "Janitor finished {} cycles. Final metrics:\n{}",
            cycles,
            self.janitor.metrics().summary()
        );
        Ok(())
    }

    /// Get a reference to the janitor's current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        self.janitor.metrics()
    }

    /// Reset the janitor's metrics counters
    pub fn reset_metrics(&mut self) {
        self.janitor.reset_metrics();
    }
}
