//! Janitor command implementation.

use crate::cli::JanitorArgs;
use crate::error::Result;
use crate::output::Formatter;
use lectern_janitor::{Janitor, JanitorConfig, JanitorWorker};
use lectern_store::SqliteQuotaLedger;

/// Execute the janitor command.
///
/// Without `--once` the worker runs until Ctrl+C on its own tokio runtime.
pub fn execute_janitor(
    args: JanitorArgs,
    config: &JanitorConfig,
    mut ledger: SqliteQuotaLedger,
    formatter: &Formatter,
) -> Result<()> {
    let mut config = config.clone();
    config.dry_run |= args.dry_run;
    if config.dry_run && !formatter.is_json() {
        eprintln!("{}", formatter.warning("Dry run: allowances are counted, not reset"));
    }

    if args.once {
        let mut janitor = Janitor::new(config)?;
        let metrics = janitor.sweep(&mut ledger)?;
        println!("{}", formatter.format_metrics(&metrics)?);
        return Ok(());
    }

    let mut worker = JanitorWorker::new(config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(worker.run(ledger))?;
    println!("{}", formatter.format_metrics(worker.metrics())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use lectern_store::QuotaConfig;

    #[test]
    fn test_single_sweep() {
        let ledger = SqliteQuotaLedger::new(":memory:", QuotaConfig::default()).unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let args = JanitorArgs {
            once: true,
            dry_run: true,
        };
        assert!(execute_janitor(args, &JanitorConfig::default(), ledger, &formatter).is_ok());
    }
}
