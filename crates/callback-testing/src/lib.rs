//! Test support for callback dispatch.
//!
//! Provides a wiremock-backed `CallbackReceiver` with scripted response
//! sequences, plus fixtures for inputs, run context and payloads.

#![allow(clippy::panic)]

pub mod fixtures;
pub mod http;

pub use http::{CallbackReceiver, MockResponse, SequenceBuilder, CALLBACK_PATH};
