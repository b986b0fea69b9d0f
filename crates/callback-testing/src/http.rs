//! Mock callback receiver built on wiremock.

use std::time::Duration;

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Path every scenario posts to.
pub const CALLBACK_PATH: &str = "/callback";

/// One scripted reply from the receiver.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with a status and optional body.
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
    /// Hold the request longer than any client timeout used in tests.
    Hang {
        /// How long to hold the request
        delay: Duration,
    },
}

impl MockResponse {
    fn template(&self) -> ResponseTemplate {
        match self {
            Self::Status { status, body } => ResponseTemplate::new(*status).set_body_string(body),
            Self::Hang { delay } => ResponseTemplate::new(200).set_delay(*delay),
        }
    }
}

/// HTTP server standing in for the callback endpoint.
pub struct CallbackReceiver {
    server: MockServer,
}

impl CallbackReceiver {
    /// Starts a new receiver on a random port.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Full URL of the callback endpoint.
    pub fn callback_url(&self) -> String {
        format!("{}{CALLBACK_PATH}", self.server.uri())
    }

    /// Answers every request with `status`.
    pub async fn always(&self, status: u16) {
        self.mount(MockResponse::Status { status, body: String::new() }, None).await;
    }

    /// Answers every request with `status` and a JSON body.
    pub async fn always_json(&self, status: u16, body: &Value) {
        self.mount(MockResponse::Status { status, body: body.to_string() }, None).await;
    }

    /// Holds every request for `delay` before answering.
    pub async fn always_hang(&self, delay: Duration) {
        self.mount(MockResponse::Hang { delay }, None).await;
    }

    /// Creates a builder for answering successive requests differently.
    pub fn sequence(&self) -> SequenceBuilder<'_> {
        SequenceBuilder { receiver: self, responses: Vec::new() }
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map(|r| r.len()).unwrap_or_default()
    }

    /// Bodies of all received requests, parsed as JSON.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Values of `header` across all received requests, in arrival order.
    pub async fn received_header(&self, header: &str) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| {
                request.headers.get(header).and_then(|v| v.to_str().ok()).map(str::to_string)
            })
            .collect()
    }

    async fn mount(&self, response: MockResponse, times: Option<u64>) {
        let mock =
            Mock::given(method("POST")).and(path(CALLBACK_PATH)).respond_with(response.template());
        let mock = match times {
            Some(n) => mock.up_to_n_times(n),
            None => mock,
        };
        mock.mount(&self.server).await;
    }
}

/// Builds a receiver that answers request `n` with the `n`-th response.
///
/// Requests beyond the scripted ones get the last response again.
pub struct SequenceBuilder<'a> {
    receiver: &'a CallbackReceiver,
    responses: Vec<MockResponse>,
}

impl SequenceBuilder<'_> {
    /// Adds a status-only response.
    pub fn respond_with(mut self, status: u16) -> Self {
        self.responses.push(MockResponse::Status { status, body: String::new() });
        self
    }

    /// Adds a response with a JSON body.
    pub fn respond_with_json(mut self, status: u16, body: &Value) -> Self {
        self.responses.push(MockResponse::Status { status, body: body.to_string() });
        self
    }

    /// Adds a response that hangs for `delay`.
    pub fn hang(mut self, delay: Duration) -> Self {
        self.responses.push(MockResponse::Hang { delay });
        self
    }

    /// Mounts the sequence on the receiver.
    pub async fn build(self) {
        let Some(last) = self.responses.last().cloned() else {
            return;
        };
        // wiremock serves the earliest mounted mock that still matches
        for response in self.responses {
            self.receiver.mount(response, Some(1)).await;
        }
        self.receiver.mount(last, None).await;
    }
}
