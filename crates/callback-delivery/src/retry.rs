//! Linear backoff policy and the dispatch state machine.
//!
//! A dispatch is `Pending(n)` while attempt `n` is due, and ends in exactly
//! one of `Delivered` or `Failed`. `DispatchState::advance` is the only place
//! that decides between retrying and giving up.

use std::time::Duration;

use crate::{error::DeliveryError, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Retry policy for a single dispatch.
///
/// Delays grow linearly: after failed attempt `n` the dispatcher waits
/// `base_delay * n` before attempt `n + 1`. No delay follows the last
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of delivery attempts (including initial attempt).
    pub max_attempts: u32,
    /// Delay unit for linear backoff.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts, base_delay }
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.checked_mul(attempt).unwrap_or(Duration::MAX)
    }

    /// Sum of all backoff delays on a dispatch that fails every attempt.
    pub fn total_backoff(&self) -> Duration {
        // base * (1 + 2 + ... + (max_attempts - 1))
        let steps = u128::from(self.max_attempts.saturating_sub(1));
        let nanos = self.base_delay.as_nanos().saturating_mul(steps * (steps + 1) / 2);
        u64::try_from(nanos).map(Duration::from_nanos).unwrap_or(Duration::MAX)
    }

    /// Upper bound on wall-clock time for one dispatch when every request
    /// is cut off at `request_timeout`.
    pub fn worst_case_duration(&self, request_timeout: Duration) -> Duration {
        request_timeout
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
            .saturating_add(self.total_backoff())
    }
}

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The receiver answered with a 2xx status.
    Success {
        /// HTTP status code
        status_code: u16,
    },
    /// The exchange failed; see `DeliveryError::is_retryable`.
    Failure(DeliveryError),
}

/// Record of one HTTP exchange. Lives only for one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    /// Attempt number (1-based).
    pub attempt_number: u32,
    /// How the exchange ended.
    pub outcome: AttemptOutcome,
    /// Human-readable description for logs.
    pub message: String,
}

impl DeliveryAttempt {
    /// Records a successful exchange.
    pub fn succeeded(attempt_number: u32, status_code: u16) -> Self {
        Self {
            attempt_number,
            outcome: AttemptOutcome::Success { status_code },
            message: format!("callback accepted with HTTP {status_code}"),
        }
    }

    /// Records a failed exchange, using the error's diagnostic as message.
    pub fn failed(attempt_number: u32, error: DeliveryError) -> Self {
        let message = error.diagnostic();
        Self { attempt_number, outcome: AttemptOutcome::Failure(error), message }
    }

    /// Whether the exchange succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }
}

/// State of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    /// Attempt `attempt` (1-based) is due.
    Pending {
        /// Next attempt number
        attempt: u32,
    },
    /// The receiver accepted the payload.
    Delivered {
        /// Attempts used
        attempts: u32,
    },
    /// No attempt succeeded.
    Failed {
        /// Attempts used
        attempts: u32,
        /// Message of the last failed attempt
        last_error: String,
    },
}

impl DispatchState {
    /// Initial state under `policy`.
    ///
    /// A policy that permits no attempts fails straight away.
    pub fn start(policy: &RetryPolicy) -> Self {
        if policy.max_attempts == 0 {
            return Self::Failed {
                attempts: 0,
                last_error: "retry policy permits no delivery attempts".to_string(),
            };
        }
        Self::Pending { attempt: 1 }
    }

    /// Applies the result of the pending attempt.
    ///
    /// Terminal states are returned unchanged.
    pub fn advance(self, attempt: &DeliveryAttempt, policy: &RetryPolicy) -> Self {
        let Self::Pending { attempt: current } = self else {
            return self;
        };

        match &attempt.outcome {
            AttemptOutcome::Success { .. } => Self::Delivered { attempts: current },
            AttemptOutcome::Failure(error)
                if error.is_retryable() && current < policy.max_attempts =>
            {
                Self::Pending { attempt: current + 1 }
            },
            AttemptOutcome::Failure(_) => {
                Self::Failed { attempts: current, last_error: attempt.message.clone() }
            },
        }
    }

    /// Whether the dispatch has finished.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}
