//! Lectern CLI - versioned regeneration of generated homework.

use anyhow::Context;
use clap::Parser;
use lectern_cli::commands;
use lectern_cli::{app, Cli, CliError, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        let code = match e.downcast_ref::<CliError>() {
            Some(cli_error) => cli_error.exit_code(),
            None => 1,
        };
        if code == lectern_cli::EXIT_TEMPFAIL {
            eprintln!("Error: {:#}. Try again shortly.", e);
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::History(args) => {
            let coordinator = app::build_coordinator(&config)?;
            commands::execute_history(args, &coordinator, &formatter)?;
        }
        Command::Regenerate(args) => {
            let coordinator = app::build_coordinator(&config)?;
            commands::execute_regenerate(args, &coordinator, &formatter)?;
        }
        Command::Select(args) => {
            let coordinator = app::build_coordinator(&config)?;
            commands::execute_select(args, &coordinator, &formatter)?;
        }
        Command::RecommendVoice(args) => {
            commands::execute_recommend_voice(args, &config.regen, &formatter)?;
        }
        Command::Quota(args) => {
            let mut ledger = app::open_ledger(&config)?;
            commands::execute_quota(args, &mut ledger, &formatter)?;
        }
        Command::Janitor(args) => {
            let ledger = app::open_ledger(&config)?;
            commands::execute_janitor(args, &config.janitor, ledger, &formatter)?;
        }
    }

    Ok(())
}
