//! Property-based tests for payload construction.
//!
//! The payload must be a pure function of its inputs: the receiver may
//! deduplicate on body content, so nothing time- or attempt-dependent may
//! leak into it.

#![allow(clippy::unwrap_used)]

use callback_core::{payload::parse_result, CoreError, Inputs, ResultPayload, RunContext};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for arbitrary JSON documents of bounded depth.
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<f64>().prop_filter("JSON has no NaN or infinity", |f| f.is_finite()).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 _-]{0,20}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn inputs_strategy() -> impl Strategy<Value = (String, String, Value)> {
    ("[a-z]{1,12}", "[A-Za-z0-9 .,]{1,40}", json_value_strategy()).prop_filter(
        "inputs must not be blank after trimming",
        |(status, summary, _)| !status.trim().is_empty() && !summary.trim().is_empty(),
    )
}

proptest! {
    /// Building twice from the same inputs yields byte-identical bodies.
    #[test]
    fn payload_is_deterministic((status, summary, result) in inputs_strategy(), run_id in 1u64..u64::MAX) {
        let inputs = Inputs::new(status, summary, result.to_string(), "https://ci.example.com/hook").unwrap();
        let context = RunContext::new("https://github.com", "acme", "widgets", run_id);

        let first = ResultPayload::build(&inputs, context.run_url()).unwrap();
        let second = ResultPayload::build(&inputs, context.run_url()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.to_json_bytes().unwrap(), second.to_json_bytes().unwrap());
    }

    /// The `result` value reaches the wire unchanged.
    #[test]
    fn result_passes_through_unchanged((status, summary, result) in inputs_strategy()) {
        let inputs = Inputs::new(status, summary, result.to_string(), "https://ci.example.com/hook").unwrap();

        let payload = ResultPayload::build(&inputs, "https://github.com/a/b/actions/runs/1").unwrap();
        let body: Value = serde_json::from_slice(&payload.to_json_bytes().unwrap()).unwrap();

        prop_assert_eq!(&body["result"], &result);
    }

    /// Any finite float written in shortest form parses back to the same bits.
    #[test]
    fn float_results_are_not_rounded(value in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let raw = value.to_string();
        let inputs = Inputs::new("success", "floats", raw.as_str(), "https://ci.example.com/hook").unwrap();

        let payload = ResultPayload::build(&inputs, "https://github.com/a/b/actions/runs/1").unwrap();
        let body: Value = serde_json::from_slice(&payload.to_json_bytes().unwrap()).unwrap();

        prop_assert_eq!(payload.result().as_f64(), Some(value));
        prop_assert_eq!(body["result"].as_f64(), Some(value));
    }

    /// Unbalanced object text is always rejected as malformed.
    #[test]
    fn unterminated_objects_are_malformed(key in "[a-z]{1,10}") {
        let raw = format!("{{\"{key}\": ");
        let is_malformed = matches!(parse_result(&raw), Err(CoreError::MalformedResult { .. }));
        prop_assert!(is_malformed);
    }
}

#[test]
fn not_json_example_is_malformed() {
    let inputs = Inputs::new("failure", "broken", "{not json", "https://ci.example.com/hook").unwrap();

    let error = ResultPayload::build(&inputs, "https://github.com/a/b/actions/runs/1").unwrap_err();

    assert!(matches!(error, CoreError::MalformedResult { .. }));
    assert!(error.to_string().starts_with("Invalid JSON in 'result'"));
}
