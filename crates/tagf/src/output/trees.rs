//! API tree output formatting.

use tagfilter_api_rs::error::ModelResult;
use tagfilter_api_rs::models::TagFilter;

/// Formats an API tree as JSON, pretty-printed unless `pretty` is false.
pub fn format_tree_json(tree: &TagFilter, pretty: bool) -> ModelResult<String> {
    if pretty {
        tree.to_json_pretty()
    } else {
        tree.to_json()
    }
}
