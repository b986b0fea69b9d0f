//! Error types for building a callback payload.
//!
//! Everything here is raised before the first HTTP request is made. None of
//! these errors is retryable: the process reports them and exits.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while reading inputs and assembling the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A required input or environment value is missing or unusable.
    #[error("{message}")]
    InvalidInput {
        /// Description naming the offending value
        message: String,
    },

    /// The `result` input is not valid JSON.
    #[error("Invalid JSON in 'result': {message}")]
    MalformedResult {
        /// Parser error message
        message: String,
    },

    /// The payload could not be encoded as JSON.
    #[error("failed to serialize payload: {message}")]
    Serialization {
        /// Encoder error message
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Creates the error for a required input that was not supplied.
    pub fn missing_input(name: &str) -> Self {
        Self::invalid_input(format!("Input required and not supplied: {name}"))
    }

    /// Creates a malformed result error.
    pub fn malformed_result(message: impl Into<String>) -> Self {
        Self::MalformedResult { message: message.into() }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_names_the_input() {
        let error = CoreError::missing_input("callback_url");
        assert_eq!(error.to_string(), "Input required and not supplied: callback_url");
    }

    #[test]
    fn malformed_result_display_format() {
        let error = CoreError::malformed_result("key must be a string at line 1 column 2");
        assert_eq!(
            error.to_string(),
            "Invalid JSON in 'result': key must be a string at line 1 column 2"
        );
    }
}
