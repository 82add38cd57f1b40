//! Command dispatch module for routing CLI commands to their handlers.

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for dispatched commands.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// A CLI command resolved to its handler.
pub enum Dispatch<'a> {
    Parse(&'a Option<String>, bool),
    Normalize(&'a Option<String>),
    ToApi(&'a Option<String>, bool),
    FromApi(&'a Option<std::path::PathBuf>),
    Check(&'a Option<String>),
    Config(&'a Option<ConfigCommands>),
    Completions(&'a crate::cli::Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Create a dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Parse { filter, explain }) => Self::Parse(filter, *explain),
            Some(Commands::Normalize { filter }) => Self::Normalize(filter),
            Some(Commands::ToApi { filter, compact }) => Self::ToApi(filter, *compact),
            Some(Commands::FromApi { file }) => Self::FromApi(file),
            Some(Commands::Check { filter }) => Self::Check(filter),
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }
}

impl Command for Dispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Parse(filter, explain) => {
                let opts = commands::convert::ParseOptions {
                    filter: (*filter).clone(),
                    explain: *explain,
                };
                commands::convert::execute_parse(ctx, &opts)
            }
            Self::Normalize(filter) => commands::convert::execute_normalize(ctx, filter.as_deref()),
            Self::ToApi(filter, compact) => {
                let opts = commands::convert::ToApiOptions {
                    filter: (*filter).clone(),
                    compact: *compact,
                };
                commands::convert::execute_to_api(ctx, &opts)
            }
            Self::FromApi(file) => commands::convert::execute_from_api(ctx, file.as_deref()),
            Self::Check(filter) => commands::convert::execute_check(ctx, filter.as_deref()),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("tagf - tag filter expression tool");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}
