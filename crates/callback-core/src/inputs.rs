//! Named action inputs supplied by the CI runner.
//!
//! The runner exposes an input called `callback_url` as the environment
//! variable `INPUT_CALLBACK_URL`. Readers take a lookup function so callers
//! and tests decide where values come from.

use crate::error::{CoreError, Result};

/// Input holding the job status string.
pub const STATUS: &str = "status";
/// Input holding the human-readable summary.
pub const SUMMARY: &str = "summary";
/// Input holding the raw JSON result text.
pub const RESULT: &str = "result";
/// Input holding the destination URL.
pub const CALLBACK_URL: &str = "callback_url";

/// The four required inputs, trimmed and known to be non-empty.
///
/// `result` is still raw text here; it becomes a JSON value when the payload
/// is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    status: String,
    summary: String,
    result: String,
    callback_url: String,
}

impl Inputs {
    /// Creates inputs from already-known values, applying the same
    /// required-value rules as the environment reader.
    pub fn new(
        status: impl Into<String>,
        summary: impl Into<String>,
        result: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            status: required(STATUS, Some(status.into()))?,
            summary: required(SUMMARY, Some(summary.into()))?,
            result: required(RESULT, Some(result.into()))?,
            callback_url: required(CALLBACK_URL, Some(callback_url.into()))?,
        })
    }

    /// Reads inputs through `lookup`, which receives environment variable
    /// names such as `INPUT_STATUS`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` for the first input that is missing
    /// or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| required(name, lookup(&input_variable(name)));

        Ok(Self {
            status: read(STATUS)?,
            summary: read(SUMMARY)?,
            result: read(RESULT)?,
            callback_url: read(CALLBACK_URL)?,
        })
    }

    /// Reads inputs from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Job status, passed through verbatim.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Job summary, passed through verbatim.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Raw JSON text of the result.
    pub fn result_text(&self) -> &str {
        &self.result
    }

    /// Destination URL, passed through verbatim.
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

/// Maps an input name to the environment variable the runner sets for it.
pub fn input_variable(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(CoreError::missing_input(name)),
    }
}
