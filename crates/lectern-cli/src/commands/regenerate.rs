//! Regenerate command implementation.

use crate::app::Coordinator;
use crate::cli::RegenerateArgs;
use crate::error::Result;
use crate::output::Formatter;
use lectern_domain::RegenerationScope;
use lectern_regen::RegenerationRequest;

/// Build the coordinator request for the parsed arguments.
pub fn build_request(args: &RegenerateArgs) -> RegenerationRequest {
    let scope = match args.unit {
        Some(index) => RegenerationScope::Unit(index),
        None => RegenerationScope::WholeArtifact,
    };

    let mut request = RegenerationRequest::new(args.user, args.artifact, scope);
    if let Some(prompt) = &args.prompt {
        request = request.with_prompt(prompt.as_str());
    }
    if let Some(voices) = args.voice_override() {
        request = request.with_voice_config(voices);
    }
    for (key, value) in &args.metadata {
        request = request.with_metadata(key.as_str(), value.as_str());
    }
    request
}

/// Execute the regenerate command.
pub fn execute_regenerate(
    args: RegenerateArgs,
    coordinator: &Coordinator,
    formatter: &Formatter,
) -> Result<()> {
    let request = build_request(&args);
    tracing::info!(artifact = %request.artifact_id, scope = %request.scope, "Regenerating");

    let record = coordinator.regenerate(request)?;
    if !formatter.is_json() {
        println!(
            "{}",
            formatter.success(&format!(
                "Created version {} of artifact {}",
                record.version, record.artifact_id
            ))
        );
    }
    println!("{}", formatter.format_record(&record)?);
    Ok(())
}
