//! Data types of the tag filter expression tree.
//!
//! These types mirror the JSON objects the monitoring REST API sends and
//! accepts wherever a resource embeds a tag filter (application
//! configurations, SLO definitions, alerting scopes and so on).

mod common;
mod tag_filter;

pub use common::*;
pub use tag_filter::*;
