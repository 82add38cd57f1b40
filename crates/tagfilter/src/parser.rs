//! Recursive descent parser for tag filter expressions.

use strsim::levenshtein;

use crate::ast::{
    BracketExpression, ComparisonExpression, EntityOrigin, EntitySpec, FilterExpression,
    FilterValue, LogicalAndExpression, LogicalOrExpression, Operator, PrimaryExpression,
    UnaryOperationExpression,
};
use crate::error::{FilterError, FilterResult};
use crate::lexer::{FilterToken, Lexer, PositionedToken};

/// Maximum depth of nested parentheses accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Maximum number of primary expressions accepted in one filter.
///
/// Chains are stored as linked lists, so this also bounds the recursion
/// depth of dropping, cloning and comparing an expression.
pub const MAX_OPERANDS: usize = 1024;

/// Maximum edit distance for "did you mean" operator suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Parser for tag filter expressions.
///
/// # Grammar
///
/// ```text
/// filter     ::= or_expr EOF
/// or_expr    ::= and_expr ("OR" and_expr)*
/// and_expr   ::= bracket ("AND" bracket)*
/// bracket    ::= "(" or_expr ")" | primary
/// primary    ::= entity OPERATOR value?
/// entity     ::= IDENT (":" (IDENT | STRING))? ("@" ("src" | "dest" | "na"))?
/// value      ::= STRING | NUMBER | BOOLEAN
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. Parentheses and primary expressions
/// 2. `AND`
/// 3. `OR`
///
/// Keywords and operator names are case-insensitive. Whether a primary takes
/// a value is decided by its operator: comparison operators require one,
/// unary operators (`IS_EMPTY`, `NOT_EMPTY`, `IS_BLANK`, `NOT_BLANK`) reject
/// one.
///
/// # Example
///
/// ```
/// use tagfilter_rs::FilterParser;
///
/// let input = "service.name EQUALS 'checkout' OR call.error.message is_empty";
/// let filter = FilterParser::parse(input).unwrap();
/// assert_eq!(filter.primaries().len(), 2);
/// assert_eq!(
///     filter.to_string(),
///     "service.name EQUALS 'checkout' OR call.error.message IS_EMPTY"
/// );
/// ```
pub struct FilterParser {
    tokens: Vec<PositionedToken>,
    position: usize,
    depth: usize,
    operands: usize,
    input_len: usize,
}

impl FilterParser {
    /// Parses a filter expression string into a [`FilterExpression`].
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptyExpression` if the input contains no tokens,
    /// a lexical error if the input cannot be tokenized, and a syntax or
    /// semantic error for the first grammar violation found.
    pub fn parse(input: &str) -> FilterResult<FilterExpression> {
        let tokens = Lexer::new(input).tokenize()?;
        if tokens.is_empty() {
            return Err(FilterError::EmptyExpression);
        }
        let token_count = tokens.len();

        let mut parser = Self {
            tokens,
            position: 0,
            depth: 0,
            operands: 0,
            input_len: input.len(),
        };
        let expression = parser.parse_or_expr()?;

        if let Some(remaining) = parser.peek() {
            return Err(FilterError::unexpected_token(
                remaining.token.describe(),
                "AND, OR or end of expression",
                remaining.position,
            ));
        }

        tracing::debug!(input_len = input.len(), token_count, "parsed tag filter");
        Ok(FilterExpression { expression })
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token type.
    fn check(&self, expected: &FilterToken) -> bool {
        self.peek().map(|pt| &pt.token) == Some(expected)
    }

    /// Consumes the current token if it matches.
    fn accept(&mut self, expected: &FilterToken) -> bool {
        let matched = self.check(expected);
        if matched {
            self.position += 1;
        }
        matched
    }

    /// Builds the error for a missing or wrong token.
    fn expected(&self, expected: &'static str) -> FilterError {
        match self.peek() {
            Some(pt) => FilterError::unexpected_token(pt.token.describe(), expected, pt.position),
            None => FilterError::UnexpectedEndOfInput {
                expected,
                position: self.input_len,
            },
        }
    }

    /// Parses OR chains: `and_expr ("OR" and_expr)*`
    fn parse_or_expr(&mut self) -> FilterResult<LogicalOrExpression> {
        let first = self.parse_and_expr()?;
        let mut rest = Vec::new();
        while self.accept(&FilterToken::Or) {
            rest.push(self.parse_and_expr()?);
        }
        Ok(LogicalOrExpression::chain(first, rest))
    }

    /// Parses AND chains: `bracket ("AND" bracket)*`
    fn parse_and_expr(&mut self) -> FilterResult<LogicalAndExpression> {
        let first = self.parse_bracket()?;
        let mut rest = Vec::new();
        while self.accept(&FilterToken::And) {
            rest.push(self.parse_bracket()?);
        }
        Ok(LogicalAndExpression::chain(first, rest))
    }

    /// Parses a parenthesized sub-expression or a primary expression.
    fn parse_bracket(&mut self) -> FilterResult<BracketExpression> {
        let open_position = self
            .peek()
            .filter(|pt| pt.token == FilterToken::OpenParen)
            .map(|pt| pt.position);
        let Some(open_position) = open_position else {
            return self.parse_primary().map(BracketExpression::Primary);
        };
        self.advance();

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FilterError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
                position: open_position,
            });
        }

        let inner = self.parse_or_expr()?;
        if !self.accept(&FilterToken::CloseParen) {
            return Err(match self.peek() {
                Some(_) => self.expected("AND, OR or ')'"),
                None => FilterError::UnclosedParenthesis {
                    position: open_position,
                },
            });
        }
        self.depth -= 1;

        Ok(BracketExpression::Bracket(Box::new(inner)))
    }

    /// Parses `entity OPERATOR value?`.
    fn parse_primary(&mut self) -> FilterResult<PrimaryExpression> {
        if let Some(start) = self.peek().map(|pt| pt.position) {
            self.operands += 1;
            if self.operands > MAX_OPERANDS {
                return Err(FilterError::TooManyOperands {
                    max: MAX_OPERANDS,
                    position: start,
                });
            }
        }
        let entity = self.parse_entity()?;

        let operator_token = match self.peek() {
            Some(pt) => pt.clone(),
            None => return Err(self.expected("an operator")),
        };
        let operator = match operator_token.token {
            FilterToken::Operator(op) => op,
            FilterToken::Identifier(word) => {
                return Err(FilterError::UnknownOperator {
                    suggestion: suggest_operator(&word),
                    operator: word,
                    position: operator_token.position,
                })
            }
            _ => return Err(self.expected("an operator")),
        };
        self.advance();

        let has_value = self.peek().is_some_and(|pt| pt.token.is_literal());
        match operator {
            Operator::Comparison(op) => {
                if !has_value {
                    return match self.peek().map(|pt| &pt.token) {
                        None
                        | Some(FilterToken::And)
                        | Some(FilterToken::Or)
                        | Some(FilterToken::CloseParen) => Err(FilterError::OperatorArity {
                            operator: op.as_str(),
                            unary: false,
                            position: operator_token.position,
                        }),
                        Some(_) => Err(self.expected("a string, number or boolean value")),
                    };
                }
                let value = match self.advance().map(|pt| pt.token) {
                    Some(FilterToken::String(s)) => FilterValue::String(s),
                    Some(FilterToken::Number(n)) => FilterValue::Number(n),
                    Some(FilterToken::Boolean(b)) => FilterValue::Boolean(b),
                    _ => return Err(self.expected("a string, number or boolean value")),
                };
                Ok(ComparisonExpression::new(entity, op, value).into())
            }
            Operator::Unary(op) => {
                if has_value {
                    return Err(FilterError::OperatorArity {
                        operator: op.as_str(),
                        unary: true,
                        position: operator_token.position,
                    });
                }
                Ok(UnaryOperationExpression::new(entity, op).into())
            }
        }
    }

    /// Parses `IDENT (":" tagKey)? ("@" origin)?`.
    fn parse_entity(&mut self) -> FilterResult<EntitySpec> {
        let identifier = match self.peek().map(|pt| &pt.token) {
            Some(FilterToken::Identifier(name)) => name.clone(),
            _ => return Err(self.expected("an entity name")),
        };
        self.advance();
        let mut entity = EntitySpec::new(identifier);

        if self.accept(&FilterToken::Colon) {
            let tag_key = match self.peek().map(|pt| &pt.token) {
                Some(FilterToken::Identifier(key)) | Some(FilterToken::String(key)) => key.clone(),
                _ => return Err(self.expected("a tag key")),
            };
            self.advance();
            entity = entity.with_tag_key(tag_key);
        }

        if self.accept(&FilterToken::At) {
            let (origin, position) = match self.peek() {
                Some(PositionedToken {
                    token: FilterToken::Identifier(origin),
                    position,
                }) => (origin.clone(), *position),
                _ => return Err(self.expected("an origin (src, dest or na)")),
            };
            self.advance();
            let origin = EntityOrigin::from_key(&origin)
                .ok_or(FilterError::InvalidOrigin { origin, position })?;
            entity = entity.with_origin(origin);
        }

        Ok(entity)
    }
}

/// Finds the supported operator closest to `word`, if any is close enough.
fn suggest_operator(word: &str) -> Option<&'static str> {
    let query = word.to_ascii_uppercase();

    let (best_match, best_distance) = Operator::names()
        .map(|name| (name, levenshtein(&query, name)))
        .min_by_key(|(_, d)| *d)?;

    (best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE).then_some(best_match)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_operator() {
        assert_eq!(suggest_operator("EQUAL"), Some("EQUALS"));
        assert_eq!(suggest_operator("contain"), Some("CONTAINS"));
        assert_eq!(suggest_operator("is_emty"), Some("IS_EMPTY"));
        assert_eq!(suggest_operator("MATCHES_REGEX"), None);
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING_DEPTH + 1;
        let input = format!("{}a IS_EMPTY{}", "(".repeat(depth), ")".repeat(depth));
        let err = FilterParser::parse(&input).unwrap_err();
        assert_eq!(
            err,
            FilterError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
                position: MAX_NESTING_DEPTH,
            }
        );

        let depth = MAX_NESTING_DEPTH;
        let input = format!("{}a IS_EMPTY{}", "(".repeat(depth), ")".repeat(depth));
        assert!(FilterParser::parse(&input).is_ok());
    }

    #[test]
    fn test_operand_limit() {
        let input = vec!["a IS_EMPTY"; MAX_OPERANDS].join(" AND ");
        let filter = FilterParser::parse(&input).unwrap();
        assert_eq!(filter.primaries().len(), MAX_OPERANDS);

        let input = vec!["a IS_EMPTY"; MAX_OPERANDS + 1].join(" OR ");
        let err = FilterParser::parse(&input).unwrap_err();
        assert_eq!(
            err,
            FilterError::TooManyOperands {
                max: MAX_OPERANDS,
                position: MAX_OPERANDS * "a IS_EMPTY OR ".len(),
            }
        );
    }

    #[test]
    fn test_long_chain_is_rejected_without_overflow() {
        let input = vec!["a IS_EMPTY"; 20_000].join(" AND ");
        let err = FilterParser::parse(&input).unwrap_err();
        assert!(matches!(
            err,
            FilterError::TooManyOperands { max: MAX_OPERANDS, .. }
        ));

        let input = vec!["(a IS_EMPTY OR b NOT_EMPTY)"; 600].join(" AND ");
        assert!(FilterParser::parse(&input).is_err());
    }

    #[test]
    fn test_sibling_brackets_do_not_accumulate_depth() {
        let input = vec!["(a IS_EMPTY)"; MAX_NESTING_DEPTH + 5].join(" AND ");
        assert!(FilterParser::parse(&input).is_ok());
    }
}
