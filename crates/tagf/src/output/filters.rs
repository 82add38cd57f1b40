//! Filter output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tagfilter_rs::{FilterExpression, FilterValue, PrimaryExpression};

/// JSON output structure for a converted filter.
#[derive(Serialize)]
pub struct FilterOutput<'a> {
    pub input: &'a str,
    pub filter: &'a str,
}

/// JSON output structure for a validated filter.
#[derive(Serialize)]
pub struct CheckOutput<'a> {
    pub valid: bool,
    pub input: &'a str,
    pub normalized: &'a str,
}

/// JSON output structure for one primary expression.
#[derive(Serialize)]
pub struct PrimaryOutput {
    pub entity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<&'static str>,
    pub operator: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl From<&PrimaryExpression> for PrimaryOutput {
    fn from(primary: &PrimaryExpression) -> Self {
        let entity = primary.entity();
        let (operator, value) = match primary {
            PrimaryExpression::Comparison(comparison) => (
                comparison.operator.as_str(),
                Some(value_to_json(&comparison.value)),
            ),
            PrimaryExpression::UnaryOperation(unary) => (unary.operator.as_str(), None),
        };
        Self {
            entity: entity.identifier.clone(),
            tag_key: entity.tag_key.clone(),
            origin: entity.origin.map(|origin| origin.key()),
            operator,
            value,
        }
    }
}

fn value_to_json(value: &FilterValue) -> Value {
    match value {
        FilterValue::String(s) => Value::String(s.clone()),
        FilterValue::Number(n) => Value::Number(n.clone()),
        FilterValue::Boolean(b) => Value::Bool(*b),
    }
}

/// Formats a converted filter as JSON.
pub fn format_filter_json(input: &str, filter: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&FilterOutput { input, filter })
}

/// Formats a successful check as JSON.
pub fn format_check_json(input: &str, normalized: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&CheckOutput {
        valid: true,
        input,
        normalized,
    })
}

/// Formats a successful check as text.
pub fn format_check_result(normalized: &str, use_colors: bool) -> String {
    let mark = if use_colors {
        "✓".green().to_string()
    } else {
        "✓".to_string()
    };
    format!("{mark} valid: {normalized}\n")
}

/// Formats the primary expressions of a filter as JSON.
pub fn format_primaries_json(
    input: &str,
    filter: &FilterExpression,
) -> Result<String, serde_json::Error> {
    let primaries: Vec<PrimaryOutput> = filter
        .primaries()
        .into_iter()
        .map(PrimaryOutput::from)
        .collect();
    let output = serde_json::json!({
        "input": input,
        "filter": filter.render(),
        "primaries": primaries,
    });
    serde_json::to_string_pretty(&output)
}

/// Formats the primary expressions of a filter as a table.
pub fn format_primaries_table(filter: &FilterExpression, use_colors: bool) -> String {
    let mut output = String::new();

    let header = format!(
        "{:<30} {:<16} {:<6} {:<22} {}",
        "Entity", "Tag Key", "Origin", "Operator", "Value"
    );
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for primary in filter.primaries() {
        let entity = primary.entity();
        let tag_key = entity.tag_key.as_deref().unwrap_or("");
        let origin = match entity.origin {
            Some(origin) => origin.key().to_string(),
            None if use_colors => "-".dimmed().to_string(),
            None => "-".to_string(),
        };
        let (operator, value) = match primary {
            PrimaryExpression::Comparison(comparison) => {
                (comparison.operator.as_str(), comparison.value.to_string())
            }
            PrimaryExpression::UnaryOperation(unary) => (unary.operator.as_str(), String::new()),
        };

        let line = format!(
            "{:<30} {:<16} {:<6} {:<22} {}",
            truncate_str(&entity.identifier, 30),
            truncate_str(tag_key, 16),
            origin,
            operator,
            value
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

/// Truncates a string to a maximum number of characters.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}
