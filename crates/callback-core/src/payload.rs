//! The JSON document posted to the callback.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{CoreError, Result},
    inputs::Inputs,
};

/// Result of a CI job as seen by the callback receiver.
///
/// Serialises to `{"status", "summary", "runUrl", "result"}` in that order.
/// `result` is whatever JSON the job produced and is never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    status: String,
    summary: String,
    run_url: String,
    result: Value,
}

impl ResultPayload {
    /// Builds the payload from validated inputs and the run URL.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedResult` if the `result` input is not
    /// valid JSON.
    pub fn build(inputs: &Inputs, run_url: impl Into<String>) -> Result<Self> {
        let result = parse_result(inputs.result_text())?;

        Ok(Self {
            status: inputs.status().to_string(),
            summary: inputs.summary().to_string(),
            run_url: run_url.into(),
            result,
        })
    }

    /// Job status.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Job summary.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Link to the workflow run.
    pub fn run_url(&self) -> &str {
        &self.run_url
    }

    /// Parsed job result.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Compact JSON encoding used as the request body.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Indented JSON for diagnostics.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parses the raw `result` text into an opaque JSON value.
pub fn parse_result(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| CoreError::malformed_result(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn inputs(result: &str) -> Inputs {
        Inputs::new("success", "3 passed", result, "https://ci.example.com/hook").unwrap()
    }

    #[test]
    fn wire_format_matches_receiver_contract() {
        let payload = ResultPayload::build(
            &inputs(r#"{"passed": 3, "failed": []}"#),
            "https://github.com/acme/widgets/actions/runs/7",
        )
        .unwrap();

        let body: Value = serde_json::from_slice(&payload.to_json_bytes().unwrap()).unwrap();

        assert_eq!(
            body,
            json!({
                "status": "success",
                "summary": "3 passed",
                "runUrl": "https://github.com/acme/widgets/actions/runs/7",
                "result": {"passed": 3, "failed": []}
            })
        );
    }

    #[test]
    fn field_order_is_stable() {
        let payload = ResultPayload::build(&inputs("null"), "u").unwrap();
        let text = String::from_utf8(payload.to_json_bytes().unwrap()).unwrap();

        assert_eq!(text, r#"{"status":"success","summary":"3 passed","runUrl":"u","result":null}"#);
    }

    #[test]
    fn scalar_results_pass_through() {
        for raw in ["42", "\"done\"", "true", "[1,2,3]", "null"] {
            let payload = ResultPayload::build(&inputs(raw), "u").unwrap();
            assert_eq!(payload.result(), &serde_json::from_str::<Value>(raw).unwrap());
        }
    }

    #[test]
    fn float_results_keep_their_exact_value() {
        for raw in ["8.321297278155931e-66", "4.673882229219307e-175", "3.424801358458985e285"] {
            let expected: f64 = raw.parse().unwrap();
            let payload = ResultPayload::build(&inputs(raw), "u").unwrap();
            let body: Value = serde_json::from_slice(&payload.to_json_bytes().unwrap()).unwrap();

            assert_eq!(payload.result().as_f64(), Some(expected), "parsed {raw}");
            assert_eq!(body["result"].as_f64(), Some(expected), "encoded {raw}");
        }
    }

    #[test]
    fn malformed_result_rejected() {
        let error = ResultPayload::build(&inputs("{not json"), "u").unwrap_err();
        assert!(matches!(error, CoreError::MalformedResult { .. }));
    }

    #[test]
    fn pretty_json_is_multiline() {
        let payload = ResultPayload::build(&inputs(r#"{"a":1}"#), "u").unwrap();
        let pretty = payload.to_pretty_json().unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("\"runUrl\": \"u\""));
    }
}
