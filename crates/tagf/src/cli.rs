use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Parse, normalize and convert tag filter expressions
#[derive(Parser, Debug)]
#[command(name = "tagf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a filter and print it back in canonical spelling
    #[command(alias = "p")]
    Parse {
        /// Filter expression (reads stdin if omitted)
        filter: Option<String>,

        /// List every primary expression of the filter
        #[arg(long)]
        explain: bool,
    },

    /// Print the canonical form a stored filter is read back as
    #[command(alias = "n")]
    Normalize {
        /// Filter expression (reads stdin if omitted)
        filter: Option<String>,
    },

    /// Convert a filter to the API tree JSON
    ToApi {
        /// Filter expression (reads stdin if omitted)
        filter: Option<String>,

        /// Print the tree on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Convert API tree JSON back to a filter expression
    FromApi {
        /// JSON file to read (reads stdin if omitted or "-")
        file: Option<PathBuf>,
    },

    /// Validate a filter; the exit code reports the result
    Check {
        /// Filter expression (reads stdin if omitted)
        filter: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (output.color, output.pretty_json)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}
