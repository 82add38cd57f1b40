//! Filter conversion commands: parse, normalize, to-api, from-api and check.
//!
//! Filter arguments are optional; when absent (or `-`), the filter is read
//! from stdin so the commands compose in pipelines.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tagfilter_api_rs::models::TagFilter;
use tagfilter_rs::{normalize, FilterParser, TagFilterMapper};

use super::{CommandContext, Result};
use crate::output;

/// Options for the parse command.
pub struct ParseOptions {
    /// Filter expression, or `None` to read stdin.
    pub filter: Option<String>,
    /// List primary expressions instead of only the rendered filter.
    pub explain: bool,
}

/// Options for the to-api command.
pub struct ToApiOptions {
    /// Filter expression, or `None` to read stdin.
    pub filter: Option<String>,
    /// Print the tree on a single line.
    pub compact: bool,
}

/// Executes the parse command.
///
/// Prints the parsed filter as written, without an API round trip, so
/// redundant parentheses and omitted origins are kept.
pub fn execute_parse(ctx: &CommandContext, opts: &ParseOptions) -> Result<()> {
    let input = read_filter(opts.filter.as_deref())?;
    let filter = FilterParser::parse(&input)?;

    if opts.explain {
        if ctx.json_output {
            println!("{}", output::format_primaries_json(&input, &filter)?);
        } else {
            if !ctx.quiet {
                println!("{}\n", filter);
            }
            print!("{}", output::format_primaries_table(&filter, ctx.use_colors));
        }
        return Ok(());
    }

    let rendered = filter.render();
    if ctx.json_output {
        println!("{}", output::format_filter_json(&input, &rendered)?);
    } else {
        println!("{rendered}");
    }
    Ok(())
}

/// Executes the normalize command.
pub fn execute_normalize(ctx: &CommandContext, filter: Option<&str>) -> Result<()> {
    let input = read_filter(filter)?;
    let canonical = normalize(&input)?;

    if ctx.json_output {
        println!("{}", output::format_filter_json(&input, &canonical)?);
    } else {
        println!("{canonical}");
    }
    Ok(())
}

/// Executes the to-api command.
pub fn execute_to_api(ctx: &CommandContext, opts: &ToApiOptions) -> Result<()> {
    let input = read_filter(opts.filter.as_deref())?;
    let filter = FilterParser::parse(&input)?;
    let tree = TagFilterMapper::to_api_model(&filter);

    tracing::debug!(nodes = tree.node_count(), "built API tree");

    let pretty = ctx.pretty_json && !opts.compact;
    println!("{}", output::format_tree_json(&tree, pretty)?);
    Ok(())
}

/// Executes the from-api command.
pub fn execute_from_api(ctx: &CommandContext, file: Option<&Path>) -> Result<()> {
    let content = match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)?,
        _ => read_stdin()?,
    };
    let tree = TagFilter::from_json(&content)?;
    tracing::debug!(nodes = tree.node_count(), "decoded API tree");

    let rendered = TagFilterMapper::from_api_model(&tree)?.render();
    if ctx.json_output {
        let output = serde_json::json!({ "filter": rendered });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{rendered}");
    }
    Ok(())
}

/// Executes the check command.
///
/// A filter is valid when it parses and its API tree reads back, which is
/// the same test the API applies when the filter is stored.
pub fn execute_check(ctx: &CommandContext, filter: Option<&str>) -> Result<()> {
    let input = read_filter(filter)?;
    let canonical = normalize(&input)?;

    if ctx.json_output {
        println!("{}", output::format_check_json(&input, &canonical)?);
    } else if !ctx.quiet {
        print!("{}", output::format_check_result(&canonical, ctx.use_colors));
    }
    Ok(())
}

/// Returns the filter argument, reading stdin when it is absent or `-`.
fn read_filter(filter: Option<&str>) -> Result<String> {
    match filter {
        Some(filter) if filter != "-" => Ok(filter.to_string()),
        _ => Ok(read_stdin()?.trim().to_string()),
    }
}

fn read_stdin() -> io::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
