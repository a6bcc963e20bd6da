//! Select command implementation.

use crate::app::Coordinator;
use crate::cli::SelectArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the select command.
pub fn execute_select(args: SelectArgs, coordinator: &Coordinator, formatter: &Formatter) -> Result<()> {
    let record = coordinator.select_version(args.artifact, args.version)?;
    if formatter.is_json() {
        println!("{}", formatter.format_record(&record)?);
    } else {
        println!(
            "{}",
            formatter.success(&format!(
                "Artifact {} now at version {}",
                record.artifact_id, record.version
            ))
        );
    }
    Ok(())
}
