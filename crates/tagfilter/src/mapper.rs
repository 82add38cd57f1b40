//! Conversion between filter expressions and the API tag filter tree.
//!
//! The API stores filters as N-ary trees: an `EXPRESSION` node joins any
//! number of elements with one logical operator. The AST is a right-recursive
//! chain instead, so converting in either direction flattens or folds chains.
//!
//! Reading a tree ([`TagFilterMapper::from_api_model`]) produces the canonical
//! AST:
//!
//! - An `AND` node with one element is replaced by that element.
//! - Elements of an `AND` node that are `AND` nodes themselves are spliced
//!   into the parent chain; `OR` elements are parenthesized.
//! - Every logical element of an `OR` node is parenthesized. An `OR` node
//!   needs at least two elements, and its first element may not be an `OR`
//!   node.
//! - A logical group at the root is parenthesized as a whole.
//! - Leaves always carry an origin, so rendering shows `@src`, `@dest` or
//!   `@na` on every entity.
//!
//! Writing a tree ([`TagFilterMapper::to_api_model`]) never fails. Entities
//! without an origin are sent as `DESTINATION`.

use tagfilter_api_rs::models::{
    ExpressionOperator, LogicalOperatorType, TagFilter, TagFilterEntity, TagFilterType,
};

use crate::ast::{
    BracketExpression, ComparisonExpression, ComparisonOperator, EntityOrigin, EntitySpec,
    FilterExpression, FilterValue, LogicalAndExpression, LogicalOrExpression, PrimaryExpression,
    UnaryOperationExpression, UnaryOperator,
};
use crate::error::{FilterError, FilterResult};
use crate::lexer::{FilterToken, Lexer};
use crate::parser::MAX_OPERANDS;

/// Largest tree accepted by [`TagFilterMapper::from_api_model`]. A filter
/// string within the operand limit never converts to a larger tree.
const MAX_TREE_NODES: usize = 2 * MAX_OPERANDS;

/// Placeholder used in error messages for absent discriminator fields.
const MISSING: &str = "<missing>";

/// Converts between [`FilterExpression`] and [`TagFilter`] trees.
///
/// # Example
///
/// ```
/// use tagfilter_api_rs::models::{ExpressionOperator, TagFilter, TagFilterEntity};
/// use tagfilter_rs::TagFilterMapper;
///
/// let tree = TagFilter::logical_and(vec![
///     TagFilter::string(
///         TagFilterEntity::Destination,
///         "service.name",
///         ExpressionOperator::Equals,
///         "checkout",
///     ),
///     TagFilter::unary(
///         TagFilterEntity::Source,
///         "call.error.message",
///         ExpressionOperator::IsEmpty,
///     ),
/// ]);
///
/// let filter = TagFilterMapper::from_api_model(&tree).unwrap();
/// assert_eq!(
///     filter.render(),
///     "(service.name@dest EQUALS 'checkout' AND call.error.message@src IS_EMPTY)"
/// );
/// assert_eq!(TagFilterMapper::to_api_model(&filter), tree);
/// ```
pub struct TagFilterMapper;

/// A mapped API node before it is placed into its parent.
enum MappedNode {
    Primary(PrimaryExpression),
    And(LogicalAndExpression),
    Or(LogicalOrExpression),
}

impl MappedNode {
    /// Wraps a logical group in parentheses; primaries stay bare.
    fn into_bracket(self) -> BracketExpression {
        match self {
            MappedNode::Primary(primary) => BracketExpression::Primary(primary),
            MappedNode::And(and) => {
                BracketExpression::Bracket(Box::new(LogicalOrExpression::single(and)))
            }
            MappedNode::Or(or) => BracketExpression::Bracket(Box::new(or)),
        }
    }
}

impl TagFilterMapper {
    /// Converts an API tree into its canonical [`FilterExpression`].
    ///
    /// # Errors
    ///
    /// Returns a mapping error for the first node that violates the tree's
    /// shape rules, such as an `OR` node with fewer than two elements or a
    /// leaf with an unsupported operator. Trees with more than twice
    /// [`MAX_OPERANDS`](crate::MAX_OPERANDS) nodes are rejected with
    /// [`FilterError::TreeTooLarge`].
    pub fn from_api_model(node: &TagFilter) -> FilterResult<FilterExpression> {
        let nodes = node.node_count();
        if nodes > MAX_TREE_NODES {
            return Err(FilterError::TreeTooLarge {
                max: MAX_TREE_NODES,
                found: nodes,
            });
        }

        let expression = match map_node(node) {
            Ok(MappedNode::Primary(primary)) => FilterExpression::primary(primary),
            Ok(group) => FilterExpression {
                expression: LogicalOrExpression::single(LogicalAndExpression::single(
                    group.into_bracket(),
                )),
            },
            Err(err) => {
                tracing::debug!(error = %err, "failed to map tag filter tree");
                return Err(err);
            }
        };

        tracing::debug!(nodes, "mapped tag filter tree to expression");
        Ok(expression)
    }

    /// Converts a [`FilterExpression`] into an API tree.
    ///
    /// Chains become N-ary nodes, single operand chains collapse into their
    /// operand and parentheses disappear. A parenthesized `AND` chain inside
    /// an `AND` chain, and a parenthesized `OR` chain in first position of an
    /// `OR` chain, are merged into the parent node.
    pub fn to_api_model(expression: &FilterExpression) -> TagFilter {
        let tree = or_to_api(&expression.expression);
        tracing::debug!(nodes = tree.node_count(), "mapped expression to tag filter tree");
        tree
    }
}

// ==================== API tree -> AST ====================

fn map_node(node: &TagFilter) -> FilterResult<MappedNode> {
    match &node.filter_type {
        Some(TagFilterType::Expression) => match &node.logical_operator {
            Some(LogicalOperatorType::And) => map_and(&node.elements),
            Some(LogicalOperatorType::Or) => map_or(&node.elements),
            other => Err(FilterError::InvalidLogicalOperator {
                found: describe(other.as_ref().map(LogicalOperatorType::as_str)),
            }),
        },
        Some(TagFilterType::TagFilter) => map_leaf(node).map(MappedNode::Primary),
        other => Err(FilterError::UnsupportedExpressionType {
            found: describe(other.as_ref().map(TagFilterType::as_str)),
        }),
    }
}

fn describe(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

fn map_and(elements: &[TagFilter]) -> FilterResult<MappedNode> {
    if let [single] = elements {
        return map_node(single);
    }

    let mut operands = Vec::with_capacity(elements.len());
    for element in elements {
        match map_node(element)? {
            MappedNode::And(and) => operands.extend(and.into_operands()),
            other => operands.push(other.into_bracket()),
        }
    }

    let mut operands = operands.into_iter();
    let first = operands.next().ok_or(FilterError::EmptyLogicalAnd)?;
    Ok(MappedNode::And(LogicalAndExpression::chain(first, operands)))
}

fn map_or(elements: &[TagFilter]) -> FilterResult<MappedNode> {
    if elements.len() < 2 {
        return Err(FilterError::TooFewLogicalOrElements {
            found: elements.len(),
        });
    }

    // Checked on the mapped node so single element AND wrappers cannot hide
    // an OR in first position.
    let first = match map_node(&elements[0])? {
        MappedNode::Or(_) => return Err(FilterError::LogicalOrAsFirstElement),
        mapped => LogicalAndExpression::single(mapped.into_bracket()),
    };

    let rest = elements[1..]
        .iter()
        .map(|element| {
            map_node(element).map(|mapped| LogicalAndExpression::single(mapped.into_bracket()))
        })
        .collect::<FilterResult<Vec<_>>>()?;

    Ok(MappedNode::Or(LogicalOrExpression::chain(first, rest)))
}

fn map_leaf(node: &TagFilter) -> FilterResult<PrimaryExpression> {
    let name = node
        .name
        .as_deref()
        .ok_or(FilterError::MissingField { field: "name" })?;
    if !is_plain_name(name) {
        return Err(FilterError::InvalidEntityName {
            name: name.to_string(),
        });
    }
    let origin = match node.entity.as_ref() {
        Some(TagFilterEntity::Source) => EntityOrigin::Source,
        Some(TagFilterEntity::Destination) => EntityOrigin::Destination,
        Some(TagFilterEntity::NotApplicable) => EntityOrigin::NotApplicable,
        Some(TagFilterEntity::Unknown(found)) => {
            return Err(FilterError::InvalidEntity {
                found: found.clone(),
            })
        }
        None => return Err(FilterError::MissingField { field: "entity" }),
    };
    let operator = node
        .operator
        .as_ref()
        .ok_or(FilterError::MissingField { field: "operator" })?;

    let mut entity = EntitySpec::new(name).with_origin(origin);
    if let Some(key) = &node.key {
        entity = entity.with_tag_key(key.clone());
    }

    match leaf_value(node, name)? {
        Some(value) => {
            let operator = comparison_operator(operator)
                .ok_or_else(|| FilterError::invalid_operator(operator.as_str(), false))?;
            Ok(ComparisonExpression::new(entity, operator, value).into())
        }
        None => {
            let operator = unary_operator(operator)
                .ok_or_else(|| FilterError::invalid_operator(operator.as_str(), true))?;
            Ok(UnaryOperationExpression::new(entity, operator).into())
        }
    }
}

/// Returns true if `name` reads back as exactly one identifier token.
///
/// Names are rendered unquoted, so keywords, operator names, literals and
/// anything containing whitespace or punctuation would not parse again.
fn is_plain_name(name: &str) -> bool {
    match Lexer::new(name).tokenize() {
        Ok(tokens) => matches!(
            tokens.as_slice(),
            [token] if matches!(&token.token, FilterToken::Identifier(word) if word == name)
        ),
        Err(_) => false,
    }
}

/// Extracts the single typed value of a leaf, if any.
fn leaf_value(node: &TagFilter, name: &str) -> FilterResult<Option<FilterValue>> {
    let count = node.typed_value_count();
    if count > 1 {
        return Err(FilterError::ConflictingValues {
            name: name.to_string(),
            count,
        });
    }

    if let Some(value) = node.tag_value() {
        return Ok(Some(FilterValue::String(value.to_string())));
    }
    if let Some(value) = &node.number_value {
        return Ok(Some(FilterValue::Number(value.clone())));
    }
    Ok(node.boolean_value.map(FilterValue::Boolean))
}

fn comparison_operator(operator: &ExpressionOperator) -> Option<ComparisonOperator> {
    use ExpressionOperator as Op;
    Some(match operator {
        Op::Equals => ComparisonOperator::Equals,
        Op::NotEqual => ComparisonOperator::NotEqual,
        Op::Contains => ComparisonOperator::Contains,
        Op::NotContain => ComparisonOperator::NotContain,
        Op::StartsWith => ComparisonOperator::StartsWith,
        Op::EndsWith => ComparisonOperator::EndsWith,
        Op::NotStartsWith => ComparisonOperator::NotStartsWith,
        Op::NotEndsWith => ComparisonOperator::NotEndsWith,
        Op::GreaterOrEqualThan => ComparisonOperator::GreaterOrEqualThan,
        Op::LessOrEqualThan => ComparisonOperator::LessOrEqualThan,
        Op::GreaterThan => ComparisonOperator::GreaterThan,
        Op::LessThan => ComparisonOperator::LessThan,
        Op::IsEmpty | Op::NotEmpty | Op::IsBlank | Op::NotBlank | Op::Unknown(_) => return None,
    })
}

fn unary_operator(operator: &ExpressionOperator) -> Option<UnaryOperator> {
    use ExpressionOperator as Op;
    match operator {
        Op::IsEmpty => Some(UnaryOperator::IsEmpty),
        Op::NotEmpty => Some(UnaryOperator::NotEmpty),
        Op::IsBlank => Some(UnaryOperator::IsBlank),
        Op::NotBlank => Some(UnaryOperator::NotBlank),
        _ => None,
    }
}

// ==================== AST -> API tree ====================

fn or_to_api(or: &LogicalOrExpression) -> TagFilter {
    if let Some(and) = or.as_single() {
        return and_to_api(and);
    }

    let mut elements = Vec::new();
    for (i, and) in or.operands().enumerate() {
        let node = and_to_api(and);
        if i == 0 && node.is_logical_or() {
            elements.extend(node.elements);
        } else {
            elements.push(node);
        }
    }
    TagFilter::logical_or(elements)
}

fn and_to_api(and: &LogicalAndExpression) -> TagFilter {
    if let Some(bracket) = and.as_single() {
        return bracket_to_api(bracket);
    }

    let mut elements = Vec::new();
    for bracket in and.operands() {
        let node = bracket_to_api(bracket);
        if node.is_logical_and() {
            elements.extend(node.elements);
        } else {
            elements.push(node);
        }
    }
    TagFilter::logical_and(elements)
}

fn bracket_to_api(bracket: &BracketExpression) -> TagFilter {
    match bracket {
        BracketExpression::Primary(primary) => primary_to_api(primary),
        BracketExpression::Bracket(inner) => or_to_api(inner),
    }
}

fn primary_to_api(primary: &PrimaryExpression) -> TagFilter {
    let entity = primary.entity();
    let origin = entity_to_api(entity.origin);
    let name = entity.identifier.as_str();
    let key = entity.tag_key.as_deref();

    match primary {
        PrimaryExpression::Comparison(comparison) => {
            let operator = ExpressionOperator::from(comparison.operator);
            let mut leaf = match (&comparison.value, key) {
                (FilterValue::String(value), Some(key)) => {
                    return TagFilter::tag(origin, name, operator, key, value.as_str())
                }
                (FilterValue::String(value), None) => {
                    TagFilter::string(origin, name, operator, value.as_str())
                }
                (FilterValue::Number(value), _) => {
                    TagFilter::number(origin, name, operator, value.clone())
                }
                (FilterValue::Boolean(value), _) => {
                    TagFilter::boolean(origin, name, operator, *value)
                }
            };
            leaf.key = key.map(str::to_string);
            leaf
        }
        PrimaryExpression::UnaryOperation(unary) => {
            let operator = ExpressionOperator::from(unary.operator);
            match key {
                Some(key) => TagFilter::unary_with_key(origin, name, key, operator),
                None => TagFilter::unary(origin, name, operator),
            }
        }
    }
}

fn entity_to_api(origin: Option<EntityOrigin>) -> TagFilterEntity {
    match origin {
        Some(EntityOrigin::Source) => TagFilterEntity::Source,
        Some(EntityOrigin::Destination) | None => TagFilterEntity::Destination,
        Some(EntityOrigin::NotApplicable) => TagFilterEntity::NotApplicable,
    }
}

impl From<ComparisonOperator> for ExpressionOperator {
    fn from(operator: ComparisonOperator) -> Self {
        match operator {
            ComparisonOperator::Equals => ExpressionOperator::Equals,
            ComparisonOperator::NotEqual => ExpressionOperator::NotEqual,
            ComparisonOperator::Contains => ExpressionOperator::Contains,
            ComparisonOperator::NotContain => ExpressionOperator::NotContain,
            ComparisonOperator::StartsWith => ExpressionOperator::StartsWith,
            ComparisonOperator::EndsWith => ExpressionOperator::EndsWith,
            ComparisonOperator::NotStartsWith => ExpressionOperator::NotStartsWith,
            ComparisonOperator::NotEndsWith => ExpressionOperator::NotEndsWith,
            ComparisonOperator::GreaterOrEqualThan => ExpressionOperator::GreaterOrEqualThan,
            ComparisonOperator::LessOrEqualThan => ExpressionOperator::LessOrEqualThan,
            ComparisonOperator::GreaterThan => ExpressionOperator::GreaterThan,
            ComparisonOperator::LessThan => ExpressionOperator::LessThan,
        }
    }
}

impl From<UnaryOperator> for ExpressionOperator {
    fn from(operator: UnaryOperator) -> Self {
        match operator {
            UnaryOperator::IsEmpty => ExpressionOperator::IsEmpty,
            UnaryOperator::NotEmpty => ExpressionOperator::NotEmpty,
            UnaryOperator::IsBlank => ExpressionOperator::IsBlank,
            UnaryOperator::NotBlank => ExpressionOperator::NotBlank,
        }
    }
}
