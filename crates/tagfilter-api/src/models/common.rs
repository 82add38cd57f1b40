//! Vocabulary types shared by every tag filter node.
//!
//! The remote API encodes discriminators and operators as upper-case strings.
//! Each type here keeps the values the API documents as named variants and
//! preserves anything else verbatim in an `Unknown` variant. Decoding a tree
//! therefore never fails because of an unexpected string; deciding whether a
//! value is acceptable is left to the consumer of the tree.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
            /// A value not documented by the API, kept as received.
            Unknown(String),
        }

        impl $name {
            /// All documented values, in declaration order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            /// Returns the wire spelling of the value.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unknown(value) => value.as_str(),
                }
            }

            /// Returns true unless the value is [`Self::Unknown`].
            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Unknown(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unknown(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Discriminator of a tag filter node (`type` field).
    pub enum TagFilterType {
        /// A logical group of nested nodes.
        Expression => "EXPRESSION",
        /// A single comparison or unary check on one entity.
        TagFilter => "TAG_FILTER",
    }
}

wire_enum! {
    /// Logical operator joining the elements of an expression node.
    pub enum LogicalOperatorType {
        /// All elements must match.
        And => "AND",
        /// At least one element must match.
        Or => "OR",
    }
}

wire_enum! {
    /// Side of a traced call a tag filter applies to.
    pub enum TagFilterEntity {
        /// The calling side.
        Source => "SOURCE",
        /// The called side.
        Destination => "DESTINATION",
        /// The tag is not bound to either side of a call.
        NotApplicable => "NOT_APPLICABLE",
    }
}

wire_enum! {
    /// Operator of a tag filter leaf.
    pub enum ExpressionOperator {
        Equals => "EQUALS",
        NotEqual => "NOT_EQUAL",
        Contains => "CONTAINS",
        NotContain => "NOT_CONTAIN",
        StartsWith => "STARTS_WITH",
        EndsWith => "ENDS_WITH",
        NotStartsWith => "NOT_STARTS_WITH",
        NotEndsWith => "NOT_ENDS_WITH",
        GreaterOrEqualThan => "GREATER_OR_EQUAL_THAN",
        LessOrEqualThan => "LESS_OR_EQUAL_THAN",
        GreaterThan => "GREATER_THAN",
        LessThan => "LESS_THAN",
        IsEmpty => "IS_EMPTY",
        NotEmpty => "NOT_EMPTY",
        IsBlank => "IS_BLANK",
        NotBlank => "NOT_BLANK",
    }
}

/// Operators that compare an entity against a value.
pub const SUPPORTED_COMPARISON_OPERATORS: &[ExpressionOperator] = &[
    ExpressionOperator::Equals,
    ExpressionOperator::NotEqual,
    ExpressionOperator::Contains,
    ExpressionOperator::NotContain,
    ExpressionOperator::StartsWith,
    ExpressionOperator::EndsWith,
    ExpressionOperator::NotStartsWith,
    ExpressionOperator::NotEndsWith,
    ExpressionOperator::GreaterOrEqualThan,
    ExpressionOperator::LessOrEqualThan,
    ExpressionOperator::GreaterThan,
    ExpressionOperator::LessThan,
];

/// Operators that check an entity without a value.
pub const SUPPORTED_UNARY_OPERATORS: &[ExpressionOperator] = &[
    ExpressionOperator::IsEmpty,
    ExpressionOperator::NotEmpty,
    ExpressionOperator::IsBlank,
    ExpressionOperator::NotBlank,
];

impl ExpressionOperator {
    /// Returns true if the operator takes no value.
    pub fn is_unary(&self) -> bool {
        SUPPORTED_UNARY_OPERATORS.contains(self)
    }

    /// Returns true if the operator compares against a value.
    pub fn is_comparison(&self) -> bool {
        SUPPORTED_COMPARISON_OPERATORS.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_round_trip_through_strings() {
        for op in ExpressionOperator::KNOWN {
            let wire: String = op.clone().into();
            assert_eq!(ExpressionOperator::from(wire), *op);
        }
        for entity in TagFilterEntity::KNOWN {
            assert_eq!(TagFilterEntity::from(entity.as_str()), *entity);
        }
    }

    #[test]
    fn test_unknown_value_is_preserved() {
        let op = ExpressionOperator::from("FOO");
        assert_eq!(op, ExpressionOperator::Unknown("FOO".to_string()));
        assert!(!op.is_known());
        assert_eq!(op.as_str(), "FOO");
        assert_eq!(String::from(op), "FOO");
    }

    #[test]
    fn test_wire_values_are_case_sensitive() {
        assert_eq!(
            LogicalOperatorType::from("and"),
            LogicalOperatorType::Unknown("and".to_string())
        );
        assert_eq!(LogicalOperatorType::from("AND"), LogicalOperatorType::And);
    }

    #[test]
    fn test_operator_arity_sets_are_disjoint_and_complete() {
        for op in ExpressionOperator::KNOWN {
            assert!(
                op.is_unary() ^ op.is_comparison(),
                "{op} must be exactly one of unary or comparison"
            );
        }
        assert!(!ExpressionOperator::from("FOO").is_unary());
        assert!(!ExpressionOperator::from("FOO").is_comparison());
    }

    #[test]
    fn test_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&TagFilterEntity::NotApplicable).unwrap();
        assert_eq!(json, "\"NOT_APPLICABLE\"");

        let parsed: TagFilterType = serde_json::from_str("\"SOMETHING_ELSE\"").unwrap();
        assert_eq!(parsed, TagFilterType::Unknown("SOMETHING_ELSE".to_string()));
    }
}
