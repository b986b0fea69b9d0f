//! Error types for callback delivery.
//!
//! Attempt-level errors (`NetworkError`, `Timeout`, `HttpStatus`) are handled
//! inside the retry loop and never escape it on their own. `DispatchFailed`
//! is what the caller sees once every attempt has been used up.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors that can occur while delivering a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Connection, DNS, TLS or other transport-level failure.
    #[error("network connection failed: {message}")]
    NetworkError {
        /// Error message describing the network failure
        message: String,
    },

    /// The request did not complete within the transport timeout.
    #[error("request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds
        timeout_ms: u64,
    },

    /// The receiver answered with a status outside 200..300.
    #[error("unexpected response status: {status_code}")]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body content
        body: String,
    },

    /// The HTTP client could not be set up.
    #[error("invalid delivery configuration: {message}")]
    ConfigurationError {
        /// Configuration error message
        message: String,
    },

    /// Every permitted attempt failed.
    #[error("Result dispatch failed after {attempts} attempts: {last_error}")]
    DispatchFailed {
        /// Number of attempts made
        attempts: u32,
        /// Diagnostic from the final attempt
        last_error: String,
    },
}

impl DeliveryError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Creates an error for a non-2xx response.
    pub fn http_status(status_code: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus { status_code, body: body.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Creates the terminal error for an exhausted dispatch.
    pub fn dispatch_failed(attempts: u32, last_error: impl Into<String>) -> Self {
        Self::DispatchFailed { attempts, last_error: last_error.into() }
    }

    /// Whether another attempt may succeed.
    ///
    /// Every status outside 200..300 counts as retryable, 4xx included.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::HttpStatus { .. } => true,
            Self::ConfigurationError { .. } | Self::DispatchFailed { .. } => false,
        }
    }

    /// Message recorded for a failed attempt.
    ///
    /// A JSON error body sent by the receiver is returned verbatim; anything
    /// else falls back to the error's display text.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::HttpStatus { body, .. } => structured_body(body)
                .map(str::to_string)
                .unwrap_or_else(|| self.to_string()),
            _ => self.to_string(),
        }
    }
}

/// Returns the trimmed body when it is a JSON document.
fn structured_body(body: &str) -> Option<&str> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(trimmed).ok().map(|_| trimmed)
}
