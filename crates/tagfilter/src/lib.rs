//! Tag filter expression language: parser, renderer and API tree mapper.
//!
//! A tag filter is a boolean expression over entities of traced calls, such as
//!
//! ```text
//! entity.name CONTAINS 'foo' AND agent.tag:environment EQUALS 'dev' OR status@na EQUALS 404
//! ```
//!
//! The same filter exists in three forms which this crate converts between:
//!
//! - the filter **string** written by users,
//! - the **AST** ([`FilterExpression`]), produced by [`FilterParser`] and
//!   rendered back to a string with [`FilterExpression::render`],
//! - the **API tree** ([`TagFilter`](tagfilter_api_rs::models::TagFilter))
//!   used by the monitoring REST API, converted with [`TagFilterMapper`].
//!
//! # Syntax
//!
//! ## Entities
//! - `name` - an attribute such as `call.http.status`
//! - `name:key` or `name:'key'` - a dynamic tag with a key
//! - `name@src`, `name@dest`, `name@na` - the side of the call
//!
//! ## Operators
//! - Comparisons take a value: `EQUALS`, `NOT_EQUAL`, `CONTAINS`,
//!   `NOT_CONTAIN`, `STARTS_WITH`, `ENDS_WITH`, `NOT_STARTS_WITH`,
//!   `NOT_ENDS_WITH`, `GREATER_THAN`, `LESS_THAN`, `GREATER_OR_EQUAL_THAN`,
//!   `LESS_OR_EQUAL_THAN`
//! - Unary operators take none: `IS_EMPTY`, `NOT_EMPTY`, `IS_BLANK`,
//!   `NOT_BLANK`
//!
//! ## Values
//! - `'single'` or `"double"` quoted strings, `\` escapes the next character
//! - numbers such as `404`, `-1`, `0.5`, `1e3`
//! - `true` / `false`
//!
//! ## Boolean Operators
//! - `AND` binds tighter than `OR`
//! - `()` - Grouping
//!
//! Keywords and operators are case-insensitive.
//!
//! # Example
//!
//! ```
//! use tagfilter_rs::{normalize, FilterParser, TagFilterMapper};
//!
//! let filter = FilterParser::parse("service.name EQUALS 'checkout'").unwrap();
//! let tree = TagFilterMapper::to_api_model(&filter);
//! assert_eq!(tree.name.as_deref(), Some("service.name"));
//!
//! assert_eq!(
//!     normalize("service.name equals 'checkout'").unwrap(),
//!     "service.name@dest EQUALS 'checkout'"
//! );
//! ```

pub mod ast;
mod error;
mod lexer;
mod mapper;
mod parser;
mod render;

pub use ast::{
    BracketExpression, ComparisonExpression, ComparisonOperator, EntityOrigin, EntitySpec,
    FilterExpression, FilterValue, LogicalAndExpression, LogicalOrExpression, Operator,
    PrimaryExpression, UnaryOperationExpression, UnaryOperator,
};
pub use error::{ErrorKind, FilterError, FilterResult};
pub use lexer::{FilterToken, Lexer, PositionedToken};
pub use mapper::TagFilterMapper;
pub use parser::{FilterParser, MAX_NESTING_DEPTH, MAX_OPERANDS};

/// Converts a filter string into its canonical form.
///
/// The filter is parsed, converted to an API tree and read back, which is
/// exactly what happens when a filter is stored and fetched again. Two
/// filters that only differ in spacing, keyword case, quoting, redundant
/// parentheses or omitted `@dest` origins normalize to the same string, and
/// normalizing a canonical string returns it unchanged.
///
/// ```
/// use tagfilter_rs::normalize;
///
/// let canonical = normalize(
///     "entity.name CONTAINS 'foo' AND agent.tag:environment EQUALS 'dev' OR status@na EQUALS 404",
/// )
/// .unwrap();
/// assert_eq!(
///     canonical,
///     "((entity.name@dest CONTAINS 'foo' AND agent.tag:'environment'@dest EQUALS 'dev') OR status@na EQUALS 404)"
/// );
/// assert_eq!(normalize(&canonical).unwrap(), canonical);
/// ```
pub fn normalize(input: &str) -> FilterResult<String> {
    let parsed = FilterParser::parse(input)?;
    let tree = TagFilterMapper::to_api_model(&parsed);
    let canonical = TagFilterMapper::from_api_model(&tree)?.render();

    tracing::debug!(
        input_len = input.len(),
        output_len = canonical.len(),
        "normalized tag filter"
    );
    Ok(canonical)
}
