//! Recommend-voice command implementation.

use crate::cli::RecommendVoiceArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lectern_regen::RegenConfig;
use lectern_voice::VoiceRecommendationEngine;
use std::fs;
use std::io::{self, Read};

/// Read the dialogue from a file or from stdin when `input` is `-`.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// Execute the recommend-voice command.
pub fn execute_recommend_voice(
    args: RecommendVoiceArgs,
    config: &RegenConfig,
    formatter: &Formatter,
) -> Result<()> {
    let script = read_input(&args.input)?;
    if script.trim().is_empty() {
        return Err(CliError::InvalidInput("dialogue is empty".to_string()));
    }

    let engine =
        VoiceRecommendationEngine::new(config.voice).map_err(|e| CliError::Config(e.to_string()))?;
    let recommendation = engine.recommend(&script);
    println!("{}", formatter.format_recommendation(&recommendation)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_input_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "M: Hello.\nW: Hi!\n").unwrap();
        let text = read_input(file.path().to_str().unwrap()).unwrap();
        assert!(text.starts_with("M: Hello."));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(read_input("/nonexistent/dialogue.txt"), Err(CliError::Io(_))));
    }
}
