//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use lectern_domain::{ArtifactId, UserId, VoiceMap};
use std::path::PathBuf;

/// Lectern CLI - Versioned homework regeneration.
#[derive(Debug, Parser)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every version of an artifact
    History(HistoryArgs),

    /// Regenerate an artifact or one of its units
    Regenerate(RegenerateArgs),

    /// Make an existing version the active one
    Select(SelectArgs),

    /// Recommend voices for a dialogue script
    RecommendVoice(RecommendVoiceArgs),

    /// Inspect or change a user's quota
    Quota(QuotaArgs),

    /// Reset daily free allowances
    Janitor(JanitorArgs),
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Artifact ID
    pub artifact: ArtifactId,
}

/// Arguments for the regenerate command.
#[derive(Debug, Parser)]
pub struct RegenerateArgs {
    /// Artifact ID
    pub artifact: ArtifactId,

    /// Regenerate only the unit at this position (0-based)
    #[arg(short, long)]
    pub unit: Option<usize>,

    /// Instruction for this revision
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Voice override (ROLE=VOICE, repeatable)
    #[arg(long = "voice", value_name = "ROLE=VOICE", value_parser = VoiceMap::parse_pair)]
    pub voices: Vec<(String, String)>,

    /// Requesting user
    #[arg(long, env = "LECTERN_USER", default_value = "1")]
    pub user: UserId,

    /// Metadata passed to the generator (KEY=VALUE, repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

impl RegenerateArgs {
    /// Voice override, if any `--voice` was given
    pub fn voice_override(&self) -> Option<VoiceMap> {
        if self.voices.is_empty() {
            None
        } else {
            Some(self.voices.iter().cloned().collect())
        }
    }
}

/// Arguments for the select command.
#[derive(Debug, Parser)]
pub struct SelectArgs {
    /// Artifact ID
    pub artifact: ArtifactId,

    /// Version to activate
    pub version: u32,
}

/// Arguments for the recommend-voice command.
#[derive(Debug, Parser)]
pub struct RecommendVoiceArgs {
    /// Dialogue file, or `-` for stdin
    pub input: String,
}

/// Arguments for quota management.
#[derive(Debug, Parser)]
pub struct QuotaArgs {
    #[command(subcommand)]
    pub action: QuotaAction,
}

/// Quota management actions.
#[derive(Debug, Subcommand)]
pub enum QuotaAction {
    /// Show a user's remaining allowance
    Status {
        /// User ID
        user: UserId,
    },

    /// Add purchased credits
    Grant {
        /// User ID
        user: UserId,
        /// Number of credits
        #[arg(short, long)]
        credits: u32,
    },

    /// Activate or extend an unlimited subscription
    Subscribe {
        /// User ID
        user: UserId,
        /// Subscription length in days
        #[arg(short, long, default_value = "30")]
        days: u64,
    },
}

/// Arguments for the janitor command.
#[derive(Debug, Parser)]
pub struct JanitorArgs {
    /// Run a single sweep and exit
    #[arg(long)]
    pub once: bool,

    /// Count allowances due for reset without resetting them
    #[arg(long)]
    pub dry_run: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

/// Parse a `KEY=VALUE` pair
fn parse_key_value(pair: &str) -> Result<(String, String), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", pair))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Empty key in '{}'", pair));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
