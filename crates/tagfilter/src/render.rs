//! Canonical string rendering of tag filter expressions.
//!
//! Every AST node implements [`fmt::Display`]. The output is canonical:
//! keywords and operators are upper case, tag keys and strings are single
//! quoted, and bracket nodes are always parenthesized. Parsing the rendered
//! string yields the same AST again.

use std::fmt::{self, Write};

use crate::ast::{
    BracketExpression, ComparisonExpression, ComparisonOperator, EntityOrigin, EntitySpec,
    FilterExpression, FilterValue, LogicalAndExpression, LogicalOrExpression, PrimaryExpression,
    UnaryOperationExpression, UnaryOperator,
};

impl FilterExpression {
    /// Renders the expression in canonical form.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expression, f)
    }
}

impl fmt::Display for LogicalOrExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, self.operands(), " OR ")
    }
}

impl fmt::Display for LogicalAndExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, self.operands(), " AND ")
    }
}

fn join<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    operands: impl Iterator<Item = T>,
    separator: &str,
) -> fmt::Result {
    for (i, operand) in operands.enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{operand}")?;
    }
    Ok(())
}

impl fmt::Display for BracketExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketExpression::Primary(primary) => fmt::Display::fmt(primary, f),
            BracketExpression::Bracket(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for PrimaryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryExpression::Comparison(comparison) => fmt::Display::fmt(comparison, f),
            PrimaryExpression::UnaryOperation(unary) => fmt::Display::fmt(unary, f),
        }
    }
}

impl fmt::Display for ComparisonExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.entity, self.operator, self.value)
    }
}

impl fmt::Display for UnaryOperationExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity, self.operator)
    }
}

impl fmt::Display for EntitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)?;
        if let Some(tag_key) = &self.tag_key {
            f.write_char(':')?;
            write_quoted(f, tag_key)?;
        }
        if let Some(origin) = self.origin {
            write!(f, "@{origin}")?;
        }
        Ok(())
    }
}

impl fmt::Display for EntityOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::String(value) => write_quoted(f, value),
            FilterValue::Number(value) => write!(f, "{value}"),
            FilterValue::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// Writes `value` in single quotes, escaping `\` and `'`.
fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterParser;

    fn render(input: &str) -> String {
        FilterParser::parse(input).unwrap().render()
    }

    #[test]
    fn test_single_primary_has_no_keyword() {
        assert_eq!(render("a equals 1"), "a EQUALS 1");
    }

    #[test]
    fn test_chains_join_operands_in_order() {
        assert_eq!(
            render("a IS_EMPTY and b IS_BLANK AND c not_blank"),
            "a IS_EMPTY AND b IS_BLANK AND c NOT_BLANK"
        );
        assert_eq!(
            render("a IS_EMPTY or b IS_BLANK and c NOT_BLANK"),
            "a IS_EMPTY OR b IS_BLANK AND c NOT_BLANK"
        );
    }

    #[test]
    fn test_brackets_are_kept() {
        assert_eq!(render("((a IS_EMPTY))"), "((a IS_EMPTY))");
        assert_eq!(
            render("(a IS_EMPTY OR b IS_EMPTY) AND c IS_EMPTY"),
            "(a IS_EMPTY OR b IS_EMPTY) AND c IS_EMPTY"
        );
    }

    #[test]
    fn test_entity_forms() {
        assert_eq!(render("agent.tag:env EQUALS 'x'"), "agent.tag:'env' EQUALS 'x'");
        assert_eq!(
            render("agent.tag:\"env\"@src EQUALS 'x'"),
            "agent.tag:'env'@src EQUALS 'x'"
        );
        assert_eq!(render("status@na EQUALS 404"), "status@na EQUALS 404");
    }

    #[test]
    fn test_values() {
        assert_eq!(render("a EQUALS \"double\""), "a EQUALS 'double'");
        assert_eq!(render(r"a EQUALS 'it\'s'"), r"a EQUALS 'it\'s'");
        assert_eq!(render(r"a EQUALS 'C:\\tmp'"), r"a EQUALS 'C:\\tmp'");
        assert_eq!(render("a EQUALS TRUE"), "a EQUALS true");
        assert_eq!(render("a GREATER_THAN -1.5"), "a GREATER_THAN -1.5");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        assert_eq!(
            render("  a   EQUALS\t'x'  OR\n(b IS_EMPTY)  "),
            "a EQUALS 'x' OR (b IS_EMPTY)"
        );
    }

    #[test]
    fn test_display_of_constructed_ast() {
        let filter = FilterExpression::primary(
            ComparisonExpression::new(
                EntitySpec::new("agent.tag")
                    .with_tag_key("it's")
                    .with_origin(EntityOrigin::Destination),
                ComparisonOperator::StartsWith,
                FilterValue::from("pre"),
            )
            .into(),
        );
        assert_eq!(filter.to_string(), r"agent.tag:'it\'s'@dest STARTS_WITH 'pre'");
    }
}
