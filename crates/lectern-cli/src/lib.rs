//! Lectern CLI library.
//!
//! Configuration loading, component wiring, command execution and output
//! formatting for the `lectern` binary.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result, EXIT_TEMPFAIL};
pub use output::Formatter;
