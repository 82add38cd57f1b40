//! Abstract Syntax Tree (AST) for tag filter expressions.
//!
//! The tree mirrors the grammar levels one to one: an OR chain of AND chains
//! of bracket expressions, where a bracket expression is either a primary
//! (one comparison or unary operation) or a parenthesized OR chain. Chains
//! are right-recursive: `a AND b AND c` is `a AND (b AND (c))` structurally,
//! although it renders without the inner grouping.

use std::iter;

use serde_json::Number;

/// Root of a parsed tag filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub expression: LogicalOrExpression,
}

/// One or more AND chains joined by `OR`.
///
/// `right` being `None` means the chain ends with `left`; there is no way to
/// express an operator without a right operand.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalOrExpression {
    pub left: LogicalAndExpression,
    pub right: Option<Box<LogicalOrExpression>>,
}

/// One or more bracket expressions joined by `AND`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalAndExpression {
    pub left: BracketExpression,
    pub right: Option<Box<LogicalAndExpression>>,
}

/// Either a primary expression or a parenthesized sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum BracketExpression {
    Primary(PrimaryExpression),
    Bracket(Box<LogicalOrExpression>),
}

/// The smallest filterable unit.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryExpression {
    Comparison(ComparisonExpression),
    UnaryOperation(UnaryOperationExpression),
}

/// Compares an entity against a literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpression {
    pub entity: EntitySpec,
    pub operator: ComparisonOperator,
    pub value: FilterValue,
}

/// Checks an entity without a value, e.g. `IS_EMPTY`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperationExpression {
    pub entity: EntitySpec,
    pub operator: UnaryOperator,
}

/// Literal compared by a [`ComparisonExpression`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Number(Number),
    Boolean(bool),
}

/// The entity a primary expression filters on.
///
/// Written as `identifier[:tagKey][@origin]`, e.g. `agent.tag:'env'@dest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    /// Metric or attribute name, e.g. `call.http.status`.
    pub identifier: String,
    /// Key of a dynamic tag such as `agent.tag`.
    pub tag_key: Option<String>,
    /// Call side qualifier; `None` when `@origin` was omitted.
    pub origin: Option<EntityOrigin>,
}

/// Which side of a traced call an entity applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityOrigin {
    Source,
    Destination,
    NotApplicable,
}

impl EntityOrigin {
    /// All origins in rendering order.
    pub const ALL: [EntityOrigin; 3] = [
        EntityOrigin::Source,
        EntityOrigin::Destination,
        EntityOrigin::NotApplicable,
    ];

    /// Returns the key written after `@`.
    pub fn key(self) -> &'static str {
        match self {
            EntityOrigin::Source => "src",
            EntityOrigin::Destination => "dest",
            EntityOrigin::NotApplicable => "na",
        }
    }

    /// Looks up an origin by its key. Keys are lower case.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|origin| origin.key() == key)
    }
}

/// Operators comparing an entity against a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equals,
    NotEqual,
    Contains,
    NotContain,
    StartsWith,
    EndsWith,
    NotStartsWith,
    NotEndsWith,
    GreaterOrEqualThan,
    LessOrEqualThan,
    GreaterThan,
    LessThan,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 12] = [
        ComparisonOperator::Equals,
        ComparisonOperator::NotEqual,
        ComparisonOperator::Contains,
        ComparisonOperator::NotContain,
        ComparisonOperator::StartsWith,
        ComparisonOperator::EndsWith,
        ComparisonOperator::NotStartsWith,
        ComparisonOperator::NotEndsWith,
        ComparisonOperator::GreaterOrEqualThan,
        ComparisonOperator::LessOrEqualThan,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::LessThan,
    ];

    /// Returns the keyword spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "EQUALS",
            ComparisonOperator::NotEqual => "NOT_EQUAL",
            ComparisonOperator::Contains => "CONTAINS",
            ComparisonOperator::NotContain => "NOT_CONTAIN",
            ComparisonOperator::StartsWith => "STARTS_WITH",
            ComparisonOperator::EndsWith => "ENDS_WITH",
            ComparisonOperator::NotStartsWith => "NOT_STARTS_WITH",
            ComparisonOperator::NotEndsWith => "NOT_ENDS_WITH",
            ComparisonOperator::GreaterOrEqualThan => "GREATER_OR_EQUAL_THAN",
            ComparisonOperator::LessOrEqualThan => "LESS_OR_EQUAL_THAN",
            ComparisonOperator::GreaterThan => "GREATER_THAN",
            ComparisonOperator::LessThan => "LESS_THAN",
        }
    }

    /// Looks up an operator by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
    }
}

/// Operators checking an entity without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    IsEmpty,
    NotEmpty,
    IsBlank,
    NotBlank,
}

impl UnaryOperator {
    pub const ALL: [UnaryOperator; 4] = [
        UnaryOperator::IsEmpty,
        UnaryOperator::NotEmpty,
        UnaryOperator::IsBlank,
        UnaryOperator::NotBlank,
    ];

    /// Returns the keyword spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::IsEmpty => "IS_EMPTY",
            UnaryOperator::NotEmpty => "NOT_EMPTY",
            UnaryOperator::IsBlank => "IS_BLANK",
            UnaryOperator::NotBlank => "NOT_BLANK",
        }
    }

    /// Looks up an operator by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
    }
}

/// Any operator keyword of the filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Comparison(ComparisonOperator),
    Unary(UnaryOperator),
}

impl Operator {
    /// Looks up an operator by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        ComparisonOperator::from_name(name)
            .map(Operator::Comparison)
            .or_else(|| UnaryOperator::from_name(name).map(Operator::Unary))
    }

    /// Returns the keyword spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Comparison(op) => op.as_str(),
            Operator::Unary(op) => op.as_str(),
        }
    }

    /// Returns the names of all operators, comparison operators first.
    pub fn names() -> impl Iterator<Item = &'static str> {
        ComparisonOperator::ALL
            .into_iter()
            .map(ComparisonOperator::as_str)
            .chain(UnaryOperator::ALL.into_iter().map(UnaryOperator::as_str))
    }
}

impl FilterExpression {
    /// Creates a filter consisting of a single primary expression.
    pub fn primary(primary: PrimaryExpression) -> Self {
        Self {
            expression: LogicalOrExpression::single(LogicalAndExpression::single(
                BracketExpression::Primary(primary),
            )),
        }
    }

    /// Returns every primary expression from left to right.
    pub fn primaries(&self) -> Vec<&PrimaryExpression> {
        let mut out = Vec::new();
        collect_primaries(&self.expression, &mut out);
        out
    }
}

fn collect_primaries<'a>(expr: &'a LogicalOrExpression, out: &mut Vec<&'a PrimaryExpression>) {
    for and in expr.operands() {
        for bracket in and.operands() {
            match bracket {
                BracketExpression::Primary(primary) => out.push(primary),
                BracketExpression::Bracket(inner) => collect_primaries(inner, out),
            }
        }
    }
}

impl LogicalOrExpression {
    /// Creates a chain with exactly one operand.
    pub fn single(left: LogicalAndExpression) -> Self {
        Self { left, right: None }
    }

    /// Right-folds `first` and `rest` into an OR chain, preserving order.
    pub fn chain(
        first: LogicalAndExpression,
        rest: impl IntoIterator<Item = LogicalAndExpression>,
    ) -> Self {
        let mut rest: Vec<_> = rest.into_iter().collect();
        let Some(last) = rest.pop() else {
            return Self::single(first);
        };
        let tail = rest
            .into_iter()
            .rev()
            .fold(Self::single(last), |right, left| Self {
                left,
                right: Some(Box::new(right)),
            });
        Self {
            left: first,
            right: Some(Box::new(tail)),
        }
    }

    /// Iterates over the operands of the chain in order.
    pub fn operands(&self) -> impl Iterator<Item = &LogicalAndExpression> {
        iter::successors(Some(self), |expr| expr.right.as_deref()).map(|expr| &expr.left)
    }

    /// Consumes the chain and returns its operands in order.
    pub fn into_operands(self) -> Vec<LogicalAndExpression> {
        let mut operands = Vec::new();
        let mut next = Some(self);
        while let Some(expr) = next {
            operands.push(expr.left);
            next = expr.right.map(|right| *right);
        }
        operands
    }

    /// Returns the inner AND chain when this chain has a single operand.
    pub fn as_single(&self) -> Option<&LogicalAndExpression> {
        match self.right {
            None => Some(&self.left),
            Some(_) => None,
        }
    }
}

impl LogicalAndExpression {
    /// Creates a chain with exactly one operand.
    pub fn single(left: BracketExpression) -> Self {
        Self { left, right: None }
    }

    /// Right-folds `first` and `rest` into an AND chain, preserving order.
    pub fn chain(
        first: BracketExpression,
        rest: impl IntoIterator<Item = BracketExpression>,
    ) -> Self {
        let mut rest: Vec<_> = rest.into_iter().collect();
        let Some(last) = rest.pop() else {
            return Self::single(first);
        };
        let tail = rest
            .into_iter()
            .rev()
            .fold(Self::single(last), |right, left| Self {
                left,
                right: Some(Box::new(right)),
            });
        Self {
            left: first,
            right: Some(Box::new(tail)),
        }
    }

    /// Iterates over the operands of the chain in order.
    pub fn operands(&self) -> impl Iterator<Item = &BracketExpression> {
        iter::successors(Some(self), |expr| expr.right.as_deref()).map(|expr| &expr.left)
    }

    /// Consumes the chain and returns its operands in order.
    pub fn into_operands(self) -> Vec<BracketExpression> {
        let mut operands = Vec::new();
        let mut next = Some(self);
        while let Some(expr) = next {
            operands.push(expr.left);
            next = expr.right.map(|right| *right);
        }
        operands
    }

    /// Returns the only operand when this chain has a single one.
    pub fn as_single(&self) -> Option<&BracketExpression> {
        match self.right {
            None => Some(&self.left),
            Some(_) => None,
        }
    }
}

impl EntitySpec {
    /// Creates an entity without tag key or origin.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            tag_key: None,
            origin: None,
        }
    }

    /// Sets the tag key.
    pub fn with_tag_key(mut self, tag_key: impl Into<String>) -> Self {
        self.tag_key = Some(tag_key.into());
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: EntityOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}

impl ComparisonExpression {
    pub fn new(entity: EntitySpec, operator: ComparisonOperator, value: FilterValue) -> Self {
        Self {
            entity,
            operator,
            value,
        }
    }
}

impl UnaryOperationExpression {
    pub fn new(entity: EntitySpec, operator: UnaryOperator) -> Self {
        Self { entity, operator }
    }
}

impl From<ComparisonExpression> for PrimaryExpression {
    fn from(value: ComparisonExpression) -> Self {
        PrimaryExpression::Comparison(value)
    }
}

impl From<UnaryOperationExpression> for PrimaryExpression {
    fn from(value: UnaryOperationExpression) -> Self {
        PrimaryExpression::UnaryOperation(value)
    }
}

impl PrimaryExpression {
    /// Returns the entity the expression filters on.
    pub fn entity(&self) -> &EntitySpec {
        match self {
            PrimaryExpression::Comparison(comparison) => &comparison.entity,
            PrimaryExpression::UnaryOperation(unary) => &unary.entity,
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(Number::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}
