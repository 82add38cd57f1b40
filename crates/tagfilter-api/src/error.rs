//! Error types for encoding and decoding tag filter trees.

use thiserror::Error;

/// A specialized Result type for wire model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while converting a tree to or from JSON.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The input is not a valid JSON tag filter tree.
    #[error("failed to decode tag filter JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The tree could not be written as JSON.
    #[error("failed to encode tag filter JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ModelError {
    /// Returns the line of the input the decoder stopped at, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ModelError::Decode(e) if e.line() > 0 => Some(e.line()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_reports_line() {
        let source = serde_json::from_str::<serde_json::Value>("{\n  \"type\": }").unwrap_err();
        let error = ModelError::Decode(source);

        assert_eq!(error.line(), Some(2));
        assert!(error.to_string().starts_with("failed to decode tag filter JSON"));
    }
}
