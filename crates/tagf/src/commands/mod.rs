//! Command implementations for the tagf CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod convert;

use std::env;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter parsing or mapping error.
    #[error("filter error: {0}")]
    Filter(#[from] tagfilter_rs::FilterError),

    /// Malformed API tree JSON.
    #[error("{0}")]
    Model(#[from] tagfilter_api_rs::error::ModelError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether API trees are pretty-printed.
    pub pretty_json: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Colors are off when `--no-color` is given, when `output.color = false`
    /// is configured, or when the `NO_COLOR` environment variable is set.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let color_allowed =
            config.output.color.unwrap_or(true) && env::var_os("NO_COLOR").is_none();
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && color_allowed,
            quiet: cli.quiet,
            pretty_json: config.output.pretty_json.unwrap_or(true),
        }
    }
}
