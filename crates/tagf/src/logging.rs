//! Diagnostic logging for the tagf CLI.
//!
//! Events from the CLI and the tag filter libraries go to stderr so that
//! stdout only carries command output.

use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

const CRATES: [&str; 3] = ["tagf", "tagfilter_rs", "tagfilter_api_rs"];

/// Returns the level implied by the global flags.
fn flag_level(cli: &Cli) -> Option<&'static str> {
    if cli.verbose {
        Some("debug")
    } else if cli.quiet {
        Some("error")
    } else {
        None
    }
}

/// Builds the event filter: `--verbose`/`--quiet` win, then `RUST_LOG`,
/// then `warn`.
fn build_env_filter(cli: &Cli) -> EnvFilter {
    let directives = |level: &str| {
        CRATES
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    };

    match flag_level(cli) {
        Some(level) => EnvFilter::new(directives(level)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives("warn"))),
    }
}

/// Installs the stderr subscriber. Does nothing if one is already set.
pub fn init(cli: &Cli) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(cli))
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flag_level() {
        let cli = Cli::try_parse_from(["tagf", "-v", "check", "a IS_EMPTY"]).unwrap();
        assert_eq!(flag_level(&cli), Some("debug"));

        let cli = Cli::try_parse_from(["tagf", "-q", "check", "a IS_EMPTY"]).unwrap();
        assert_eq!(flag_level(&cli), Some("error"));

        let cli = Cli::try_parse_from(["tagf", "check", "a IS_EMPTY"]).unwrap();
        assert_eq!(flag_level(&cli), None);
    }

    #[test]
    fn test_verbose_filter_covers_library_crates() {
        let cli = Cli::try_parse_from(["tagf", "-v", "check", "a IS_EMPTY"]).unwrap();
        let filter = build_env_filter(&cli).to_string();
        assert!(filter.contains("tagfilter_rs=debug"), "{filter}");
        assert!(filter.contains("tagfilter_api_rs=debug"), "{filter}");
    }
}
