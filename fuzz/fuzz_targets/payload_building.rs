#![no_main]

//! Fuzz target for result payload building.
//!
//! The `result` input is arbitrary text from the workflow. Building a payload
//! must either succeed with the parsed value passed through unchanged or fail
//! with a malformed-result error, never panic.

use callback_core::{CoreError, Inputs, ResultPayload};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(inputs) = Inputs::new("success", "fuzz", raw, "http://localhost/callback") else {
        // blank text is rejected as a missing input
        assert!(raw.trim().is_empty());
        return;
    };

    match ResultPayload::build(&inputs, "https://github.com/o/r/actions/runs/1".to_string()) {
        Ok(payload) => {
            let expected: Value = serde_json::from_str(raw.trim()).unwrap();
            assert_eq!(payload.result(), &expected);

            let bytes = payload.to_json_bytes().unwrap();
            let decoded: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded["result"], expected);
        },
        Err(CoreError::MalformedResult { .. }) => {
            assert!(serde_json::from_str::<Value>(raw.trim()).is_err());
        },
        Err(other) => panic!("unexpected error: {other}"),
    }
});
