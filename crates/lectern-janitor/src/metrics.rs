//! Metrics collection for Janitor operations

/// Metrics collected during Janitor operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JanitorMetrics {
    /// Free allowances reset
    pub allowances_reset: usize,

    /// Allowances found due for reset in dry-run mode
    pub allowances_pending: usize,

    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Sweeps that failed
    pub failed_sweeps: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record reset allowances
    pub fn record_reset(&mut self, count: usize) {
        self.allowances_reset += count;
    }

    /// Record allowances a dry run would have reset
    pub fn record_pending(&mut self, count: usize) {
        self.allowances_pending += count;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Record a failed sweep
    pub fn record_failure(&mut self) {
        self.failed_sweeps += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Failed sweeps: {}", self.failed_sweeps),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Allowances reset: {}", self.allowances_reset),
        ];
        if self.allowances_pending > 0 {
            lines.push(format!("Allowances pending (dry run): {}", self.allowances_pending));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = JanitorMetrics::new();
        assert_eq!(metrics.allowances_reset, 0);
        assert_eq!(metrics.sweep_count, 0);
    }

    #[test]
    fn test_record_and_reset() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_reset(3);
        metrics.record_reset(2);
        metrics.record_sweep();
        metrics.record_failure();
        assert_eq!(metrics.allowances_reset, 5);
        assert_eq!(metrics.failed_sweeps, 1);

        metrics.reset();
        assert_eq!(metrics, JanitorMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_reset(4);
        metrics.record_sweep();
        metrics.total_runtime_ms = 12;

        let summary = metrics.summary();
        assert!(summary.contains("Sweep cycles: 1"));
        assert!(summary.contains("Allowances reset: 4"));
        assert!(summary.contains("Total runtime: 12ms"));
        assert!(!summary.contains("dry run"));

        metrics.record_pending(2);
        assert!(metrics.summary().contains("Allowances pending (dry run): 2"));
    }
}
