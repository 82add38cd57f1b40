use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod dispatch;
mod logging;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use dispatch::{Command, Dispatch};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = error_code(&e), "command failed");
            if cli.json {
                let error_json = error_json(&e);
                let text = serde_json::to_string_pretty(&error_json)
                    .unwrap_or_else(|_| error_json.to_string());
                eprintln!("{text}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    let config = load_config()?;
    let ctx = CommandContext::new(cli, &config);
    Dispatch::from_cli(cli).execute(&ctx)
}

/// Builds the JSON error object printed with `--json`.
///
/// Filter errors also carry their kind and, when known, the byte offset in
/// the filter string. Malformed tree JSON carries the line it broke on.
fn error_json(e: &CommandError) -> serde_json::Value {
    let mut error = serde_json::json!({
        "code": error_code(e),
        "message": e.to_string(),
    });
    if let CommandError::Filter(filter_error) = e {
        error["kind"] = serde_json::json!(format!("{:?}", filter_error.kind()).to_lowercase());
        if let Some(position) = filter_error.position() {
            error["position"] = serde_json::json!(position);
        }
    }
    if let Some(line) = model_error_line(e) {
        error["line"] = serde_json::json!(line);
    }
    serde_json::json!({ "error": error })
}

fn model_error_line(e: &CommandError) -> Option<usize> {
    match e {
        CommandError::Model(model_error) => model_error.line(),
        _ => None,
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Model(_) => "INVALID_TREE",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Filter(_) => ExitCode::from(1),
        CommandError::Json(_) => ExitCode::from(1),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Model(_) => ExitCode::from(4),
        CommandError::Config(_) => ExitCode::from(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagfilter_rs::FilterError;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&CommandError::Filter(FilterError::EmptyExpression)),
            "FILTER_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::Config("bad".to_string())),
            "CONFIG_ERROR"
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(error_code(&CommandError::Io(io)), "IO_ERROR");
    }

    #[test]
    fn test_error_exit_codes() {
        let code = |e: CommandError| format!("{:?}", error_exit_code(&e));
        assert_eq!(
            code(CommandError::Filter(FilterError::EmptyExpression)),
            format!("{:?}", ExitCode::from(1))
        );
        assert_eq!(
            code(CommandError::Config("bad".to_string())),
            format!("{:?}", ExitCode::from(5))
        );
    }

    #[test]
    fn test_filter_error_json_has_kind_and_position() {
        let err = CommandError::Filter(FilterError::UnclosedParenthesis { position: 12 });
        let json = error_json(&err);
        assert_eq!(json["error"]["code"], "FILTER_ERROR");
        assert_eq!(json["error"]["kind"], "syntax");
        assert_eq!(json["error"]["position"], 12);
    }

    #[test]
    fn test_tree_error_json_has_line() {
        let source = serde_json::from_str::<serde_json::Value>("{\n  \"type\": }").unwrap_err();
        let err = CommandError::Model(tagfilter_api_rs::error::ModelError::Decode(source));
        let json = error_json(&err);
        assert_eq!(json["error"]["code"], "INVALID_TREE");
        assert_eq!(json["error"]["line"], 2);
        assert!(json["error"].get("kind").is_none());
    }

    #[test]
    fn test_mapping_error_json_has_no_position() {
        let err = CommandError::Filter(FilterError::EmptyLogicalAnd);
        let json = error_json(&err);
        assert_eq!(json["error"]["kind"], "mapping");
        assert!(json["error"].get("position").is_none());
    }
}
