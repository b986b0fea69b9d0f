//! Bounded retry loop that delivers one payload to one callback.

use std::sync::Arc;

use bytes::Bytes;
use callback_core::{Clock, ResultPayload};
use tracing::{debug, error, info, warn};

use crate::{
    client::{DeliveryRequest, Transport},
    error::DeliveryError,
    outcome::DispatchOutcome,
    retry::{DeliveryAttempt, DispatchState, RetryPolicy},
};

/// Delivers result payloads with linear backoff between attempts.
///
/// Attempts run strictly one after another. Each is bounded by the
/// transport's timeout, so a dispatch never takes longer than
/// `RetryPolicy::worst_case_duration`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
}

impl Dispatcher {
    /// Creates a dispatcher.
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>, policy: RetryPolicy) -> Self {
        Self { transport, clock, policy }
    }

    /// Retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Posts `payload` to `callback_url` until it is accepted or the policy's
    /// attempts run out.
    pub async fn send(&self, payload: &ResultPayload, callback_url: &str) -> DispatchOutcome {
        let body = match payload.to_json_bytes() {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                error!(error = %e, "failed to encode result payload");
                return DispatchOutcome::Failed { attempts: 0, last_error: e.to_string() };
            },
        };

        info!(url = %callback_url, "Posting result to {callback_url}");
        if let Ok(pretty) = payload.to_pretty_json() {
            debug!("Payload: {pretty}");
        }

        let started = self.clock.now();
        let mut state = DispatchState::start(&self.policy);

        loop {
            match state {
                DispatchState::Pending { attempt } => {
                    let record = self.attempt(callback_url, body.clone(), attempt).await;
                    state = state.advance(&record, &self.policy);

                    if !record.is_success() {
                        warn!(attempt, "Attempt {attempt} failed: {}", record.message);
                    }

                    if !state.is_terminal() {
                        let delay = self.policy.delay_after(attempt);
                        debug!(attempt, delay_ms = delay.as_millis(), "backing off before retry");
                        self.clock.sleep(delay).await;
                    }
                },
                DispatchState::Delivered { attempts } => {
                    info!(
                        attempts,
                        elapsed_ms = self.clock.now().duration_since(started).as_millis(),
                        "Successfully posted result"
                    );
                    return DispatchOutcome::Delivered { attempts };
                },
                DispatchState::Failed { attempts, last_error } => {
                    error!(
                        attempts,
                        last_error = %last_error,
                        "Failed to post result after {attempts} attempts"
                    );
                    return DispatchOutcome::Failed { attempts, last_error };
                },
            }
        }
    }

    async fn attempt(&self, url: &str, body: Bytes, attempt_number: u32) -> DeliveryAttempt {
        let request = DeliveryRequest { url: url.to_string(), body, attempt_number };

        match self.transport.post(request).await {
            Ok(response) if response.is_success => {
                DeliveryAttempt::succeeded(attempt_number, response.status_code)
            },
            Ok(response) => DeliveryAttempt::failed(
                attempt_number,
                DeliveryError::http_status(response.status_code, response.body),
            ),
            Err(e) => DeliveryAttempt::failed(attempt_number, e),
        }
    }
}
