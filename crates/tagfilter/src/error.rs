//! Error types for parsing, rendering and mapping tag filters.

use thiserror::Error;

/// A specialized Result type for tag filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Broad classification of a [`FilterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input contains a character or literal the lexer cannot read.
    Lexical,
    /// The tokens do not form a valid expression.
    Syntax,
    /// The expression is well formed but uses an operator incorrectly.
    Semantic,
    /// An API tree violates the shape rules of the tag filter model.
    Mapping,
}

/// Errors that can occur while converting tag filters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    // ==================== Lexical ====================
    /// A character that cannot start any token.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    /// A quoted string without its closing quote.
    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    /// A numeric literal that cannot be represented.
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },

    // ==================== Syntax ====================
    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token {token} at position {position}, expected {expected}")]
    UnexpectedToken {
        /// The token as written in the input.
        token: String,
        /// What the parser was looking for.
        expected: &'static str,
        position: usize,
    },

    /// The input ended in the middle of an expression.
    #[error("unexpected end of expression at position {position}, expected {expected}")]
    UnexpectedEndOfInput {
        expected: &'static str,
        position: usize,
    },

    /// An opening parenthesis without a matching closing one.
    #[error("unclosed parenthesis opened at position {position}")]
    UnclosedParenthesis { position: usize },

    /// Parentheses nested deeper than the parser accepts.
    #[error("expression nested deeper than {max} levels at position {position}")]
    NestingTooDeep { max: usize, position: usize },

    /// More primary expressions than the parser accepts in one filter.
    #[error("filter has more than {max} expressions, limit exceeded at position {position}")]
    TooManyOperands { max: usize, position: usize },

    /// An `@origin` qualifier that is not `src`, `dest` or `na`.
    #[error("invalid entity origin '{origin}' at position {position}, expected one of src, dest, na")]
    InvalidOrigin { origin: String, position: usize },

    // ==================== Semantic ====================
    /// A word in operator position that is not a supported operator.
    #[error("unknown operator '{operator}' at position {position}{}", suggestion_hint(.suggestion))]
    UnknownOperator {
        operator: String,
        /// Closest supported operator name, if any is similar enough.
        suggestion: Option<&'static str>,
        position: usize,
    },

    /// An operator used with the wrong number of operands.
    #[error("operator {operator} at position {position} {}", arity_hint(.unary))]
    OperatorArity {
        operator: &'static str,
        /// True when the operator is unary and a value was supplied.
        unary: bool,
        position: usize,
    },

    // ==================== Mapping ====================
    /// A node whose `type` is missing or not supported.
    #[error("unsupported tag filter expression of type {found}")]
    UnsupportedExpressionType { found: String },

    /// An expression node whose `logicalOperator` is missing or not supported.
    #[error("invalid logical operator {found}")]
    InvalidLogicalOperator { found: String },

    /// A leaf operator outside the supported set for its arity.
    #[error("invalid operator {operator}: not a supported tag filter operator for a {}", operator_role(.unary))]
    InvalidOperator { operator: String, unary: bool },

    /// A leaf whose `entity` is not supported.
    #[error("invalid tag filter entity {found}")]
    InvalidEntity { found: String },

    /// A required field of a leaf is absent.
    #[error("tag filter is missing required field {field}")]
    MissingField { field: &'static str },

    /// A leaf that carries more than one typed value.
    #[error("tag filter {name} has {count} values, at most one of stringValue, numberValue and booleanValue is allowed")]
    ConflictingValues { name: String, count: usize },

    /// An `AND` node without elements.
    #[error("at least one element is expected for logical and")]
    EmptyLogicalAnd,

    /// An `OR` node with fewer than two elements.
    #[error("at least two elements are expected for logical or, found {found}")]
    TooFewLogicalOrElements { found: usize },

    /// An `OR` node whose first element is itself an `OR` node.
    #[error("logical or is not allowed for first element of a logical or")]
    LogicalOrAsFirstElement,

    /// A leaf name that would not read back as a single entity name.
    #[error("invalid tag filter name '{name}': not a plain entity name")]
    InvalidEntityName { name: String },

    /// A tree with more leaves than a filter string may contain.
    #[error("tag filter tree has {found} leaves, at most {max} are allowed")]
    TreeTooLarge { max: usize, found: usize },
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean {name}?)"),
        None => String::new(),
    }
}

fn arity_hint(unary: &bool) -> &'static str {
    if *unary {
        "does not accept a value"
    } else {
        "requires a value"
    }
}

fn operator_role(unary: &bool) -> &'static str {
    if *unary {
        "unary operation"
    } else {
        "comparison"
    }
}

impl FilterError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        use FilterError::*;
        match self {
            UnexpectedCharacter { .. } | UnterminatedString { .. } | InvalidNumber { .. } => {
                ErrorKind::Lexical
            }
            EmptyExpression
            | UnexpectedToken { .. }
            | UnexpectedEndOfInput { .. }
            | UnclosedParenthesis { .. }
            | NestingTooDeep { .. }
            | TooManyOperands { .. }
            | InvalidOrigin { .. } => ErrorKind::Syntax,
            UnknownOperator { .. } | OperatorArity { .. } => ErrorKind::Semantic,
            UnsupportedExpressionType { .. }
            | InvalidLogicalOperator { .. }
            | InvalidOperator { .. }
            | InvalidEntity { .. }
            | MissingField { .. }
            | ConflictingValues { .. }
            | EmptyLogicalAnd
            | TooFewLogicalOrElements { .. }
            | LogicalOrAsFirstElement
            | InvalidEntityName { .. }
            | TreeTooLarge { .. } => ErrorKind::Mapping,
        }
    }

    /// Returns the byte offset in the filter string the error refers to.
    ///
    /// Mapping errors and [`FilterError::EmptyExpression`] have no position.
    pub fn position(&self) -> Option<usize> {
        use FilterError::*;
        match self {
            UnexpectedCharacter { position, .. }
            | UnterminatedString { position }
            | InvalidNumber { position, .. }
            | UnexpectedToken { position, .. }
            | UnexpectedEndOfInput { position, .. }
            | UnclosedParenthesis { position }
            | NestingTooDeep { position, .. }
            | TooManyOperands { position, .. }
            | InvalidOrigin { position, .. }
            | UnknownOperator { position, .. }
            | OperatorArity { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(
        token: impl Into<String>,
        expected: &'static str,
        position: usize,
    ) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
            expected,
            position,
        }
    }

    /// Creates an invalid operator error for a leaf of the given arity.
    pub fn invalid_operator(operator: impl Into<String>, unary: bool) -> Self {
        FilterError::InvalidOperator {
            operator: operator.into(),
            unary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_operator_message_names_operator() {
        let message = FilterError::invalid_operator("FOO", false).to_string();
        assert!(message.contains("invalid operator"));
        assert!(message.contains("FOO"));
        assert!(message.contains("tag filter operator"));
    }

    #[test]
    fn test_unknown_operator_message_includes_suggestion() {
        let error = FilterError::UnknownOperator {
            operator: "EQUAL".to_string(),
            suggestion: Some("EQUALS"),
            position: 7,
        };
        assert_eq!(
            error.to_string(),
            "unknown operator 'EQUAL' at position 7 (did you mean EQUALS?)"
        );

        let error = FilterError::UnknownOperator {
            operator: "LIKE".to_string(),
            suggestion: None,
            position: 7,
        };
        assert_eq!(error.to_string(), "unknown operator 'LIKE' at position 7");
    }

    #[test]
    fn test_operator_arity_message() {
        let error = FilterError::OperatorArity {
            operator: "IS_EMPTY",
            unary: true,
            position: 3,
        };
        assert_eq!(
            error.to_string(),
            "operator IS_EMPTY at position 3 does not accept a value"
        );
        assert_eq!(error.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_kind_and_position() {
        let lexical = FilterError::UnexpectedCharacter {
            character: '#',
            position: 4,
        };
        assert_eq!(lexical.kind(), ErrorKind::Lexical);
        assert_eq!(lexical.position(), Some(4));

        let mapping = FilterError::LogicalOrAsFirstElement;
        assert_eq!(mapping.kind(), ErrorKind::Mapping);
        assert_eq!(mapping.position(), None);

        assert_eq!(FilterError::EmptyExpression.kind(), ErrorKind::Syntax);
        assert_eq!(FilterError::EmptyExpression.position(), None);
    }

    #[test]
    fn test_first_element_message() {
        assert!(FilterError::LogicalOrAsFirstElement
            .to_string()
            .contains("logical or is not allowed for first element"));
    }
}
