//! History command implementation.

use crate::app::Coordinator;
use crate::cli::HistoryArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the history command.
pub fn execute_history(args: HistoryArgs, coordinator: &Coordinator, formatter: &Formatter) -> Result<()> {
    let records = coordinator.list_history(args.artifact)?;
    println!("{}", formatter.format_history(&records)?);
    Ok(())
}
