//! Prelude module for convenient imports.
//!
//! ```
//! use tagfilter_api_rs::prelude::*;
//!
//! let node = TagFilter::logical_and(vec![]);
//! assert_eq!(node.logical_operator, Some(LogicalOperatorType::And));
//! ```

// Error types
pub use crate::error::{ModelError, ModelResult};

// Tree and vocabulary
pub use crate::models::{
    ExpressionOperator, LogicalOperatorType, TagFilter, TagFilterEntity, TagFilterType,
    SUPPORTED_COMPARISON_OPERATORS, SUPPORTED_UNARY_OPERATORS,
};
