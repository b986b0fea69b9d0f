//! Inputs, run context and result payload for CI callback dispatch.
//!
//! Everything that has to be true before the first HTTP request lives here:
//! required inputs are present, the run URL can be composed and the `result`
//! text is valid JSON. The delivery crate takes a finished `ResultPayload`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod inputs;
pub mod payload;
pub mod run_context;
pub mod time;

pub use error::{CoreError, Result};
pub use inputs::Inputs;
pub use payload::ResultPayload;
pub use run_context::RunContext;
pub use time::{Clock, RealClock, TestClock};
