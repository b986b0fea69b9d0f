//! Ready-made inputs and payloads.

use callback_core::{Inputs, ResultPayload, RunContext};
use serde_json::{json, Value};

/// Run context for `acme/widgets`, run 4242, on github.com.
pub fn run_context() -> RunContext {
    RunContext::new("https://github.com", "acme", "widgets", 4242)
}

/// Typical test-report result.
pub fn sample_result() -> Value {
    json!({
        "passed": 128,
        "failed": 0,
        "skipped": 3,
        "suites": ["unit", "integration"]
    })
}

/// Inputs pointing at `callback_url` with the sample result.
pub fn inputs_for(callback_url: &str) -> Inputs {
    inputs_with_result(callback_url, &sample_result().to_string())
}

/// Inputs with a caller-chosen raw result text.
///
/// # Panics
///
/// Panics if any value is blank; fixtures are expected to be valid.
pub fn inputs_with_result(callback_url: &str, result: &str) -> Inputs {
    Inputs::new("success", "All checks passed", result, callback_url)
        .unwrap_or_else(|e| panic!("fixture inputs must be valid: {e}"))
}

/// Payload built from `inputs_for(callback_url)` and `run_context()`.
///
/// # Panics
///
/// Panics if the sample result fails to parse, which would be a fixture bug.
pub fn payload_for(callback_url: &str) -> ResultPayload {
    ResultPayload::build(&inputs_for(callback_url), run_context().run_url())
        .unwrap_or_else(|e| panic!("fixture payload must build: {e}"))
}
