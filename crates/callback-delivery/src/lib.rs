//! Delivery of CI job results to an HTTP callback.
//!
//! A `Dispatcher` posts one `ResultPayload` to one URL, retrying with linear
//! backoff until the receiver answers 2xx or the attempt budget is spent:
//!
//! 1. **Attempt** - POST the JSON body through a `Transport` with a
//!    per-request timeout
//! 2. **Classify** - 2xx delivers; any other status or transport error is a
//!    retryable failure
//! 3. **Back off** - wait `base_delay * attempt` before the next attempt
//! 4. **Finish** - return `Delivered` or `Failed` with the last diagnostic
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use callback_core::{Inputs, RealClock, ResultPayload};
//! use callback_delivery::{DeliveryClient, Dispatcher, RetryPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = Inputs::new("success", "all green", "{}", "https://ci.example.com/hook")?;
//! let payload = ResultPayload::build(&inputs, "https://github.com/o/r/actions/runs/1")?;
//!
//! let dispatcher = Dispatcher::new(
//!     Arc::new(DeliveryClient::with_defaults()?),
//!     Arc::new(RealClock::new()),
//!     RetryPolicy::default(),
//! );
//! let attempts = dispatcher.send(&payload, inputs.callback_url()).await.into_result()?;
//! # let _ = attempts;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod retry;

pub use client::{ClientConfig, DeliveryClient, DeliveryRequest, DeliveryResponse, Transport};
pub use dispatcher::Dispatcher;
pub use error::{DeliveryError, Result};
pub use outcome::DispatchOutcome;
pub use retry::{DeliveryAttempt, DispatchState, RetryPolicy};

/// Default number of delivery attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff unit in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 2000;

/// Default HTTP request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
