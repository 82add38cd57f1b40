//! Integration tests for reading API tag filter trees.
//!
//! Trees are decoded from JSON as the REST API returns them, then mapped to
//! filter expressions.

use serde_json::json;
use tagfilter_api_rs::models::{ExpressionOperator, TagFilter, TagFilterEntity};
use tagfilter_rs::{
    BracketExpression, ComparisonExpression, ComparisonOperator, EntityOrigin, EntitySpec,
    ErrorKind, FilterError, FilterExpression, FilterValue, LogicalAndExpression,
    LogicalOrExpression, FilterParser, TagFilterMapper, UnaryOperationExpression, UnaryOperator,
    MAX_OPERANDS,
};

fn tree(value: serde_json::Value) -> TagFilter {
    TagFilter::from_value(value).unwrap()
}

fn leaf(name: &str) -> serde_json::Value {
    json!({
        "type": "TAG_FILTER",
        "name": name,
        "entity": "DESTINATION",
        "operator": "EQUALS",
        "stringValue": name,
        "value": name
    })
}

fn primary(name: &str) -> BracketExpression {
    BracketExpression::Primary(
        ComparisonExpression::new(
            EntitySpec::new(name).with_origin(EntityOrigin::Destination),
            ComparisonOperator::Equals,
            FilterValue::from(name),
        )
        .into(),
    )
}

/// Returns the group inside the root bracket of a mapped logical node.
fn root_group(filter: &FilterExpression) -> &LogicalOrExpression {
    match filter.expression.as_single().and_then(LogicalAndExpression::as_single) {
        Some(BracketExpression::Bracket(inner)) => &**inner,
        other => panic!("expected a bracketed root, got {other:?}"),
    }
}

fn map_err(value: serde_json::Value) -> FilterError {
    TagFilterMapper::from_api_model(&tree(value)).unwrap_err()
}

// ==================== Leaf Tests ====================

#[test]
fn test_string_leaf() {
    let filter = TagFilterMapper::from_api_model(&tree(leaf("service.name"))).unwrap();
    assert_eq!(
        filter,
        FilterExpression {
            expression: LogicalOrExpression::single(LogicalAndExpression::single(primary(
                "service.name"
            ))),
        }
    );
    assert_eq!(filter.render(), "service.name@dest EQUALS 'service.name'");
}

#[test]
fn test_number_and_boolean_leaves() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "TAG_FILTER",
        "name": "call.http.status",
        "entity": "NOT_APPLICABLE",
        "operator": "GREATER_OR_EQUAL_THAN",
        "numberValue": 500,
        "value": 500
    })))
    .unwrap();
    assert_eq!(
        filter.render(),
        "call.http.status@na GREATER_OR_EQUAL_THAN 500"
    );

    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "TAG_FILTER",
        "name": "call.erroneous",
        "entity": "SOURCE",
        "operator": "EQUALS",
        "booleanValue": true
    })))
    .unwrap();
    assert_eq!(filter.render(), "call.erroneous@src EQUALS true");
}

#[test]
fn test_unary_leaf() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "TAG_FILTER",
        "name": "call.error.message",
        "entity": "DESTINATION",
        "operator": "NOT_BLANK"
    })))
    .unwrap();
    assert_eq!(
        filter,
        FilterExpression::primary(
            UnaryOperationExpression::new(
                EntitySpec::new("call.error.message").with_origin(EntityOrigin::Destination),
                UnaryOperator::NotBlank,
            )
            .into()
        )
    );
}

#[test]
fn test_tag_leaf_strips_key_prefix() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "TAG_FILTER",
        "name": "agent.tag",
        "key": "environment",
        "entity": "DESTINATION",
        "operator": "EQUALS",
        "stringValue": "environment=dev",
        "value": "dev"
    })))
    .unwrap();
    assert_eq!(
        filter.render(),
        "agent.tag:'environment'@dest EQUALS 'dev'"
    );
}

#[test]
fn test_names_that_would_not_read_back_are_rejected() {
    for name in ["or", "AND", "contains", "true", "http status", "5xx.count", "a@src", "a:b", ""] {
        let err = map_err(leaf(name));
        assert_eq!(
            err,
            FilterError::InvalidEntityName {
                name: name.to_string()
            },
            "{name:?}"
        );
        assert_eq!(err.kind(), ErrorKind::Mapping);
    }
}

#[test]
fn test_accepted_names_read_back() {
    for name in ["call.http.status", "k8s/pod-name", "orders", "src", "is_empty_count"] {
        let filter = TagFilterMapper::from_api_model(&tree(leaf(name))).unwrap();
        let reparsed = FilterParser::parse(&filter.render()).unwrap();
        assert_eq!(reparsed, filter, "{name:?}");
    }
}

#[test]
fn test_invalid_operator_is_named() {
    let mut value = leaf("a");
    value["operator"] = json!("FOO");
    let err = map_err(value);

    assert_eq!(err, FilterError::invalid_operator("FOO", false));
    let message = err.to_string();
    assert!(message.contains("FOO"), "{message}");
    assert!(message.contains("tag filter operator"), "{message}");
    assert_eq!(err.kind(), ErrorKind::Mapping);
}

#[test]
fn test_operator_scoped_by_value_presence() {
    let mut comparison_without_value = leaf("a");
    let fields = comparison_without_value.as_object_mut().unwrap();
    fields.remove("stringValue");
    fields.remove("value");
    assert_eq!(
        map_err(comparison_without_value),
        FilterError::invalid_operator("EQUALS", true)
    );

    let mut unary_with_value = leaf("a");
    unary_with_value["operator"] = json!("IS_EMPTY");
    assert_eq!(
        map_err(unary_with_value),
        FilterError::invalid_operator("IS_EMPTY", false)
    );
}

#[test]
fn test_conflicting_values() {
    let mut value = leaf("a");
    value["numberValue"] = json!(1);
    assert_eq!(
        map_err(value),
        FilterError::ConflictingValues {
            name: "a".to_string(),
            count: 2,
        }
    );
}

#[test]
fn test_unknown_entity_and_type() {
    let mut value = leaf("a");
    value["entity"] = json!("BOTH");
    assert_eq!(
        map_err(value),
        FilterError::InvalidEntity {
            found: "BOTH".to_string()
        }
    );

    let mut value = leaf("a");
    value["type"] = json!("GROUP");
    let err = map_err(value);
    assert_eq!(
        err,
        FilterError::UnsupportedExpressionType {
            found: "GROUP".to_string()
        }
    );
    assert!(err.to_string().contains("unsupported tag filter expression"));
}

// ==================== Logical And Tests ====================

#[test]
fn test_and_with_one_element_is_unwrapped() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "EXPRESSION",
        "logicalOperator": "AND",
        "elements": [leaf("a")]
    })))
    .unwrap();
    let direct = TagFilterMapper::from_api_model(&tree(leaf("a"))).unwrap();
    assert_eq!(filter, direct);
}

#[test]
fn test_and_without_elements_is_rejected() {
    let err = map_err(json!({
        "type": "EXPRESSION",
        "logicalOperator": "AND",
        "elements": []
    }));
    assert_eq!(err, FilterError::EmptyLogicalAnd);
    assert_eq!(err.kind(), ErrorKind::Mapping);
}

#[test]
fn test_and_chain_is_right_folded() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "EXPRESSION",
        "logicalOperator": "AND",
        "elements": [leaf("a"), leaf("b"), leaf("c")]
    })))
    .unwrap();
    assert_eq!(
        root_group(&filter),
        &LogicalOrExpression::single(LogicalAndExpression::chain(
            primary("a"),
            vec![primary("b"), primary("c")]
        ))
    );
}

#[test]
fn test_or_inside_and_is_bracketed() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "EXPRESSION",
        "logicalOperator": "AND",
        "elements": [
            leaf("a"),
            {"type": "EXPRESSION", "logicalOperator": "OR", "elements": [leaf("b"), leaf("c")]}
        ]
    })))
    .unwrap();
    assert_eq!(
        filter.render(),
        "(a@dest EQUALS 'a' AND (b@dest EQUALS 'b' OR c@dest EQUALS 'c'))"
    );
}

// ==================== Logical Or Tests ====================

#[test]
fn test_or_with_too_few_elements_is_rejected() {
    for elements in [json!([]), json!([leaf("a")])] {
        let count = elements.as_array().map(Vec::len).unwrap();
        let err = map_err(json!({
            "type": "EXPRESSION",
            "logicalOperator": "OR",
            "elements": elements
        }));
        assert_eq!(err, FilterError::TooFewLogicalOrElements { found: count });
        assert_eq!(err.kind(), ErrorKind::Mapping);
    }
}

#[test]
fn test_or_with_or_as_first_element_is_rejected() {
    let err = map_err(json!({
        "type": "EXPRESSION",
        "logicalOperator": "OR",
        "elements": [
            {"type": "EXPRESSION", "logicalOperator": "OR", "elements": [leaf("a"), leaf("b")]},
            leaf("c")
        ]
    }));
    assert_eq!(err, FilterError::LogicalOrAsFirstElement);
    assert!(err.to_string().contains("first element"));
}

#[test]
fn test_or_behind_single_element_and_is_rejected_as_first_element() {
    let err = map_err(json!({
        "type": "EXPRESSION",
        "logicalOperator": "OR",
        "elements": [
            {
                "type": "EXPRESSION",
                "logicalOperator": "AND",
                "elements": [{
                    "type": "EXPRESSION",
                    "logicalOperator": "OR",
                    "elements": [leaf("a"), leaf("b")]
                }]
            },
            leaf("c")
        ]
    }));
    assert_eq!(err, FilterError::LogicalOrAsFirstElement);
}

#[test]
fn test_or_in_later_position_is_bracketed() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "EXPRESSION",
        "logicalOperator": "OR",
        "elements": [
            leaf("a"),
            {"type": "EXPRESSION", "logicalOperator": "OR", "elements": [leaf("b"), leaf("c")]}
        ]
    })))
    .unwrap();
    assert_eq!(
        filter.render(),
        "(a@dest EQUALS 'a' OR (b@dest EQUALS 'b' OR c@dest EQUALS 'c'))"
    );
}

#[test]
fn test_and_inside_or_is_bracketed() {
    let filter = TagFilterMapper::from_api_model(&tree(json!({
        "type": "EXPRESSION",
        "logicalOperator": "OR",
        "elements": [
            {"type": "EXPRESSION", "logicalOperator": "AND", "elements": [leaf("a"), leaf("b")]},
            leaf("c")
        ]
    })))
    .unwrap();

    let and = LogicalAndExpression::chain(primary("a"), vec![primary("b")]);
    assert_eq!(
        root_group(&filter),
        &LogicalOrExpression::chain(
            LogicalAndExpression::single(BracketExpression::Bracket(Box::new(
                LogicalOrExpression::single(and)
            ))),
            vec![LogicalAndExpression::single(primary("c"))]
        )
    );
    assert_eq!(
        filter.render(),
        "((a@dest EQUALS 'a' AND b@dest EQUALS 'b') OR c@dest EQUALS 'c')"
    );
}

#[test]
fn test_invalid_logical_operator() {
    let err = map_err(json!({
        "type": "EXPRESSION",
        "logicalOperator": "XOR",
        "elements": [leaf("a"), leaf("b")]
    }));
    assert_eq!(
        err,
        FilterError::InvalidLogicalOperator {
            found: "XOR".to_string()
        }
    );
}

#[test]
fn test_nested_errors_propagate_unchanged() {
    let mut bad = leaf("c");
    bad["operator"] = json!("MATCHES");
    let err = map_err(json!({
        "type": "EXPRESSION",
        "logicalOperator": "AND",
        "elements": [
            leaf("a"),
            {"type": "EXPRESSION", "logicalOperator": "OR", "elements": [leaf("b"), bad]}
        ]
    }));
    assert_eq!(err, FilterError::invalid_operator("MATCHES", false));
}

#[test]
fn test_constructed_tree_matches_decoded_tree() {
    let constructed = TagFilter::logical_or(vec![
        TagFilter::logical_and(vec![
            TagFilter::string(TagFilterEntity::Destination, "a", ExpressionOperator::Equals, "a"),
            TagFilter::string(TagFilterEntity::Destination, "b", ExpressionOperator::Equals, "b"),
        ]),
        TagFilter::string(TagFilterEntity::Destination, "c", ExpressionOperator::Equals, "c"),
    ]);
    let decoded = tree(json!({
        "type": "EXPRESSION",
        "logicalOperator": "OR",
        "elements": [
            {"type": "EXPRESSION", "logicalOperator": "AND", "elements": [leaf("a"), leaf("b")]},
            leaf("c")
        ]
    }));
    assert_eq!(constructed, decoded);
}

// ==================== Size Limit Tests ====================

fn wide_and(leaves: usize) -> serde_json::Value {
    json!({
        "type": "EXPRESSION",
        "logicalOperator": "AND",
        "elements": vec![leaf("a"); leaves]
    })
}

#[test]
fn test_tree_at_operand_limit_is_mapped() {
    let filter = TagFilterMapper::from_api_model(&tree(wide_and(MAX_OPERANDS))).unwrap();
    assert_eq!(filter.primaries().len(), MAX_OPERANDS);
}

#[test]
fn test_oversized_tree_is_rejected() {
    let err = map_err(wide_and(20_000));
    assert_eq!(
        err,
        FilterError::TreeTooLarge {
            max: 2 * MAX_OPERANDS,
            found: 20_001,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Mapping);
}
