//! Error types for fixture handling

use thiserror::Error;

/// Fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex decoding error
    #[error("Hex error: {0}")]
    Hex(String),

    /// Malformed fixture field
    #[error("Parse error: {0}")]
    Parse(String),

    /// Execution did not match the expectation
    #[error("Assertion failed: {0}")]
    Assertion(String),
}

impl From<hex::FromHexError> for FixtureError {
    fn from(e: hex::FromHexError) -> Self {
        FixtureError::Hex(e.to_string())
    }
}

/// Fixture result type
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_error() {
        let err: FixtureError = hex::decode("abc").unwrap_err().into();
        assert!(matches!(err, FixtureError::Hex(_)));
        assert!(err.to_string().starts_with("Hex error"));
    }

    #[test]
    fn test_from_json_error() {
        let err: FixtureError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(matches!(err, FixtureError::Json(_)));
    }
}
