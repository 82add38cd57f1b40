//! Tag filter expression tree as exchanged with the REST API.
//!
//! A tree node is either a logical expression (`type = EXPRESSION`) grouping
//! an ordered list of child nodes, or a leaf (`type = TAG_FILTER`) comparing
//! one entity. Both shapes share a single flat JSON object, so they share a
//! single struct here as well; fields that do not apply to a shape are `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::common::{ExpressionOperator, LogicalOperatorType, TagFilterEntity, TagFilterType};
use crate::error::{ModelError, ModelResult};

/// A node of a tag filter expression tree.
///
/// # Examples
///
/// ```
/// use tagfilter_api_rs::models::{ExpressionOperator, TagFilter, TagFilterEntity};
///
/// let tree = TagFilter::logical_or(vec![
///     TagFilter::string(
///         TagFilterEntity::Destination,
///         "service.name",
///         ExpressionOperator::Equals,
///         "checkout",
///     ),
///     TagFilter::unary(
///         TagFilterEntity::NotApplicable,
///         "call.error.message",
///         ExpressionOperator::IsEmpty,
///     ),
/// ]);
///
/// assert!(tree.is_logical_or());
/// assert_eq!(tree.elements.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilter {
    /// Node discriminator.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<TagFilterType>,

    /// Operator joining `elements` (expression nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperatorType>,

    /// Child nodes in order (expression nodes only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<TagFilter>,

    /// Name of the filtered entity, e.g. `call.http.status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Side of the call the entity belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<TagFilterEntity>,

    /// Comparison or unary operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ExpressionOperator>,

    /// Tag key for dynamic tags such as `agent.tag`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,

    /// Untyped copy of the compared value. The API fills it on read; typed
    /// fields take precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl TagFilter {
    /// Creates a logical expression node.
    pub fn expression(operator: LogicalOperatorType, elements: Vec<TagFilter>) -> Self {
        Self {
            filter_type: Some(TagFilterType::Expression),
            logical_operator: Some(operator),
            elements,
            ..Self::default()
        }
    }

    /// Creates an `AND` expression node.
    pub fn logical_and(elements: Vec<TagFilter>) -> Self {
        Self::expression(LogicalOperatorType::And, elements)
    }

    /// Creates an `OR` expression node.
    pub fn logical_or(elements: Vec<TagFilter>) -> Self {
        Self::expression(LogicalOperatorType::Or, elements)
    }

    fn leaf(
        entity: TagFilterEntity,
        name: impl Into<String>,
        operator: ExpressionOperator,
    ) -> Self {
        Self {
            filter_type: Some(TagFilterType::TagFilter),
            name: Some(name.into()),
            entity: Some(entity),
            operator: Some(operator),
            ..Self::default()
        }
    }

    /// Creates a leaf comparing against a string value.
    pub fn string(
        entity: TagFilterEntity,
        name: impl Into<String>,
        operator: ExpressionOperator,
        value: impl Into<String>,
    ) -> Self {
        let value = value.into();
        Self {
            value: Some(Value::String(value.clone())),
            string_value: Some(value),
            ..Self::leaf(entity, name, operator)
        }
    }

    /// Creates a leaf comparing against a number value.
    pub fn number(
        entity: TagFilterEntity,
        name: impl Into<String>,
        operator: ExpressionOperator,
        value: impl Into<Number>,
    ) -> Self {
        let value = value.into();
        Self {
            value: Some(Value::Number(value.clone())),
            number_value: Some(value),
            ..Self::leaf(entity, name, operator)
        }
    }

    /// Creates a leaf comparing against a boolean value.
    pub fn boolean(
        entity: TagFilterEntity,
        name: impl Into<String>,
        operator: ExpressionOperator,
        value: bool,
    ) -> Self {
        Self {
            value: Some(Value::Bool(value)),
            boolean_value: Some(value),
            ..Self::leaf(entity, name, operator)
        }
    }

    /// Creates a leaf comparing the value of a dynamic tag.
    ///
    /// The API expects the string value of a keyed tag as `<key>=<value>`,
    /// with the plain value mirrored in `value`.
    ///
    /// ```
    /// use tagfilter_api_rs::models::{ExpressionOperator, TagFilter, TagFilterEntity};
    ///
    /// let leaf = TagFilter::tag(
    ///     TagFilterEntity::Destination,
    ///     "agent.tag",
    ///     ExpressionOperator::Equals,
    ///     "environment",
    ///     "prod",
    /// );
    /// assert_eq!(leaf.string_value.as_deref(), Some("environment=prod"));
    /// assert_eq!(leaf.key.as_deref(), Some("environment"));
    /// assert_eq!(leaf.tag_value(), Some("prod"));
    /// ```
    pub fn tag(
        entity: TagFilterEntity,
        name: impl Into<String>,
        operator: ExpressionOperator,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        Self {
            string_value: Some(format!("{key}={value}")),
            value: Some(Value::String(value)),
            key: Some(key),
            ..Self::leaf(entity, name, operator)
        }
    }

    /// Creates a leaf without a value.
    pub fn unary(
        entity: TagFilterEntity,
        name: impl Into<String>,
        operator: ExpressionOperator,
    ) -> Self {
        Self::leaf(entity, name, operator)
    }

    /// Creates a leaf without a value on a dynamic tag.
    pub fn unary_with_key(
        entity: TagFilterEntity,
        name: impl Into<String>,
        key: impl Into<String>,
        operator: ExpressionOperator,
    ) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::leaf(entity, name, operator)
        }
    }

    /// Returns true for `EXPRESSION` nodes.
    pub fn is_expression(&self) -> bool {
        self.filter_type == Some(TagFilterType::Expression)
    }

    /// Returns true for `EXPRESSION` nodes joined with `AND`.
    pub fn is_logical_and(&self) -> bool {
        self.is_expression() && self.logical_operator == Some(LogicalOperatorType::And)
    }

    /// Returns true for `EXPRESSION` nodes joined with `OR`.
    pub fn is_logical_or(&self) -> bool {
        self.is_expression() && self.logical_operator == Some(LogicalOperatorType::Or)
    }

    /// Returns true for `TAG_FILTER` leaves.
    pub fn is_tag_filter(&self) -> bool {
        self.filter_type == Some(TagFilterType::TagFilter)
    }

    /// Number of typed value fields that are set.
    pub fn typed_value_count(&self) -> usize {
        [
            self.string_value.is_some(),
            self.number_value.is_some(),
            self.boolean_value.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Returns the string value with the `<key>=` prefix of keyed tags removed.
    pub fn tag_value(&self) -> Option<&str> {
        let value = self.string_value.as_deref()?;
        match self.key.as_deref() {
            Some(key) => Some(
                value
                    .strip_prefix(key)
                    .and_then(|rest| rest.strip_prefix('='))
                    .unwrap_or(value),
            ),
            None => Some(value),
        }
    }

    /// Total number of nodes in the tree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.elements.iter().map(TagFilter::node_count).sum::<usize>()
    }

    /// Decodes a tree from its JSON representation.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json).map_err(ModelError::Decode)
    }

    /// Decodes a tree from an already parsed JSON value.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        serde_json::from_value(value).map_err(ModelError::Decode)
    }

    /// Encodes the tree as compact JSON.
    pub fn to_json(&self) -> ModelResult<String> {
        serde_json::to_string(self).map_err(ModelError::Encode)
    }

    /// Encodes the tree as indented JSON.
    pub fn to_json_pretty(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self).map_err(ModelError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_serializes_only_populated_fields() {
        let leaf = TagFilter::number(
            TagFilterEntity::NotApplicable,
            "call.http.status",
            ExpressionOperator::Equals,
            404,
        );
        let json: Value = serde_json::to_value(&leaf).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "TAG_FILTER",
                "name": "call.http.status",
                "entity": "NOT_APPLICABLE",
                "operator": "EQUALS",
                "numberValue": 404,
                "value": 404
            })
        );
    }

    #[test]
    fn test_expression_serializes_elements() {
        let tree = TagFilter::logical_and(vec![
            TagFilter::unary(TagFilterEntity::Source, "a", ExpressionOperator::IsEmpty),
            TagFilter::boolean(TagFilterEntity::Source, "b", ExpressionOperator::Equals, true),
        ]);
        let json: Value = serde_json::to_value(&tree).unwrap();

        assert_eq!(json["type"], "EXPRESSION");
        assert_eq!(json["logicalOperator"], "AND");
        assert_eq!(json["elements"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["elements"][1]["booleanValue"], true);
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_tag_value_strips_key_prefix() {
        let leaf = TagFilter::tag(
            TagFilterEntity::Destination,
            "agent.tag",
            ExpressionOperator::Equals,
            "environment",
            "dev=local",
        );
        assert_eq!(leaf.string_value.as_deref(), Some("environment=dev=local"));
        assert_eq!(leaf.tag_value(), Some("dev=local"));
    }

    #[test]
    fn test_tag_value_without_prefix_is_returned_unchanged() {
        let mut leaf = TagFilter::string(
            TagFilterEntity::Destination,
            "agent.tag",
            ExpressionOperator::Equals,
            "prod",
        );
        leaf.key = Some("environment".to_string());
        assert_eq!(leaf.tag_value(), Some("prod"));
    }

    #[test]
    fn test_typed_value_count() {
        let mut leaf = TagFilter::unary(TagFilterEntity::Source, "a", ExpressionOperator::IsBlank);
        assert_eq!(leaf.typed_value_count(), 0);
        leaf.string_value = Some("x".to_string());
        leaf.boolean_value = Some(false);
        assert_eq!(leaf.typed_value_count(), 2);
    }

    #[test]
    fn test_node_count() {
        let leaf = TagFilter::unary(TagFilterEntity::Source, "a", ExpressionOperator::IsBlank);
        let tree = TagFilter::logical_or(vec![
            leaf.clone(),
            TagFilter::logical_and(vec![leaf.clone(), leaf]),
        ]);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_from_json_reports_malformed_input() {
        let err = TagFilter::from_json("{\"type\": 42}").unwrap_err();
        assert!(matches!(err, ModelError::Decode(_)));
    }
}
