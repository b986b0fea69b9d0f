//! HTTP transport for callback delivery.
//!
//! `Transport` is the seam the dispatcher talks to. `DeliveryClient` is the
//! production implementation on top of reqwest; `mock::ScriptedTransport`
//! replays canned responses for tests.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info_span, Instrument};

use crate::error::{DeliveryError, Result};

/// Header carrying the 1-based attempt number.
pub const ATTEMPT_HEADER: &str = "X-Callback-Attempt";

/// Largest response body kept for diagnostics.
const MAX_RESPONSE_BODY_SIZE: usize = 64 * 1024;

/// Configuration for the callback HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-request timeout, enforced by the client.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
            user_agent: concat!("callback-dispatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// One POST of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Destination URL.
    pub url: String,
    /// JSON-encoded payload.
    pub body: Bytes,
    /// Attempt number for this delivery (1-based).
    pub attempt_number: u32,
}

/// Response from a delivery attempt that reached the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body, truncated for diagnostics.
    pub body: String,
    /// Total duration of the request.
    pub duration: Duration,
    /// Whether the status was in 200..300.
    pub is_success: bool,
}

impl DeliveryResponse {
    /// Builds a response, deriving `is_success` from the status code.
    pub fn new(status_code: u16, body: impl Into<String>, duration: Duration) -> Self {
        Self {
            status_code,
            body: body.into(),
            duration,
            is_success: (200..300).contains(&status_code),
        }
    }
}

/// Sends one JSON POST and reports what came back.
///
/// Implementations must bound each call by their own timeout. Any response
/// that was received, whatever its status, is `Ok`; `Err` is reserved for
/// exchanges that never produced a response.
///
/// Errors for which `DeliveryError::is_retryable` is false end the dispatch
/// after the current attempt. `DeliveryClient` only returns `NetworkError`
/// and `Timeout`, which are always retried; `ConfigurationError` is for
/// transports that detect a fault no retry can fix.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Posts `request.body` to `request.url` as `application/json`.
    async fn post(&self, request: DeliveryRequest) -> Result<DeliveryResponse>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl DeliveryClient {
    /// Creates a new delivery client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a new delivery client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Effective configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn classify(&self, error: &reqwest::Error) -> DeliveryError {
        if error.is_timeout() {
            let timeout_ms = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
            return DeliveryError::timeout(timeout_ms);
        }
        DeliveryError::network(error_chain(error))
    }
}

#[async_trait]
impl Transport for DeliveryClient {
    async fn post(&self, request: DeliveryRequest) -> Result<DeliveryResponse> {
        let span = info_span!(
            "callback_delivery",
            url = %request.url,
            attempt = request.attempt_number
        );

        async move {
            let start_time = Instant::now();
            tracing::debug!(body_bytes = request.body.len(), "sending callback request");

            let response = self
                .client
                .post(&request.url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(ATTEMPT_HEADER, request.attempt_number.to_string())
                .body(request.body)
                .send()
                .await
                .map_err(|e| {
                    tracing::debug!(
                        duration_ms = start_time.elapsed().as_millis(),
                        "request failed: {e}"
                    );
                    self.classify(&e)
                })?;

            let status_code = response.status().as_u16();
            let body = match response.bytes().await {
                Ok(bytes) => truncate_body(&bytes),
                Err(e) => {
                    tracing::debug!("failed to read response body: {e}");
                    String::new()
                },
            };
            let duration = start_time.elapsed();

            tracing::debug!(
                status = status_code,
                duration_ms = duration.as_millis(),
                "received callback response"
            );

            Ok(DeliveryResponse::new(status_code, body, duration))
        }
        .instrument(span)
        .await
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    if bytes.len() > MAX_RESPONSE_BODY_SIZE {
        let truncated = String::from_utf8_lossy(&bytes[..MAX_RESPONSE_BODY_SIZE]);
        format!("{truncated}... (truncated)")
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Joins an error with its sources, reqwest hides the useful part there.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub mod mock {
    //! Scripted transport for exercising the dispatcher without a network.

    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{DeliveryRequest, DeliveryResponse, Transport};
    use crate::error::{DeliveryError, Result};

    /// Replays queued results in order and records every request.
    ///
    /// Once the script runs out, further calls fail with a network error.
    /// Clones share the script and the request log.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedTransport {
        script: Arc<Mutex<VecDeque<Result<DeliveryResponse>>>>,
        requests: Arc<Mutex<Vec<DeliveryRequest>>>,
    }

    impl ScriptedTransport {
        /// Creates a transport with an empty script.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a response with the given status and body.
        pub fn respond(self, status_code: u16, body: impl Into<String>) -> Self {
            self.push(Ok(DeliveryResponse::new(status_code, body, Duration::from_millis(1))))
        }

        /// Queues a transport-level failure.
        pub fn fail(self, error: DeliveryError) -> Self {
            self.push(Err(error))
        }

        /// Queues `count` copies of the same status.
        pub fn respond_times(mut self, count: usize, status_code: u16) -> Self {
            for _ in 0..count {
                self = self.respond(status_code, "");
            }
            self
        }

        /// Requests received so far.
        pub fn requests(&self) -> Vec<DeliveryRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }

        /// Number of requests received so far.
        pub fn call_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or_default()
        }

        fn push(self, result: Result<DeliveryResponse>) -> Self {
            if let Ok(mut script) = self.script.lock() {
                script.push_back(result);
            }
            self
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post(&self, request: DeliveryRequest) -> Result<DeliveryResponse> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            self.script
                .lock()
                .ok()
                .and_then(|mut script| script.pop_front())
                .unwrap_or_else(|| Err(DeliveryError::network("no scripted response")))
        }
    }
}
