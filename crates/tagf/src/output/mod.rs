//! Output formatting utilities for the tagf CLI.
//!
//! This module provides functions for formatting filters and API trees as
//! text, tables or JSON.
//!
//! - [`filters`] - Filter output formatting (parse, normalize, check, explain)
//! - [`trees`] - API tree JSON formatting (to-api)

mod filters;
mod trees;

pub use filters::{
    format_check_json, format_check_result, format_filter_json, format_primaries_json,
    format_primaries_table,
};
pub use trees::format_tree_json;
