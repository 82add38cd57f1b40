//! Wire model for tag filter expression trees.
//!
//! The monitoring REST API stores every tag filter as a recursive JSON tree
//! of logical expression nodes and tag filter leaves. This crate provides
//! the serde types for that tree and nothing else: it performs no network
//! I/O and does not judge whether a decoded tree is semantically valid.
//!
//! # Quick Start
//!
//! ```
//! use tagfilter_api_rs::prelude::*;
//!
//! let json = r#"{
//!     "type": "TAG_FILTER",
//!     "name": "service.name",
//!     "entity": "DESTINATION",
//!     "operator": "EQUALS",
//!     "stringValue": "checkout"
//! }"#;
//!
//! let leaf = TagFilter::from_json(json).unwrap();
//! assert!(leaf.is_tag_filter());
//! assert_eq!(leaf.operator, Some(ExpressionOperator::Equals));
//! ```

pub mod error;
pub mod models;
pub mod prelude;
