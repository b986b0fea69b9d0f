//! Reports a CI job result to an HTTP callback.
//!
//! The binary reads the action inputs and run identifiers from the
//! environment, builds the result payload and hands it to the dispatcher.
//! This library half exists so the whole pipeline can be driven from tests
//! with an injected dispatcher.

#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use callback_core::{Inputs, RealClock, ResultPayload, RunContext};
use callback_delivery::{DeliveryClient, Dispatcher};

pub mod config;
pub mod telemetry;

pub use config::Config;

/// Builds the production dispatcher from configuration.
pub fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let client = DeliveryClient::new(config.to_client_config())
        .context("Failed to create callback HTTP client")?;

    Ok(Dispatcher::new(Arc::new(client), Arc::new(RealClock::new()), config.to_retry_policy()))
}

/// Builds the payload and delivers it, returning the attempts used.
///
/// # Errors
///
/// Fails without any HTTP request when the `result` input is not valid
/// JSON, and with a dispatch failure once every attempt has failed.
pub async fn dispatch_result(
    dispatcher: &Dispatcher,
    inputs: &Inputs,
    context: &RunContext,
) -> Result<u32> {
    let payload = ResultPayload::build(inputs, context.run_url())?;

    let attempts = dispatcher.send(&payload, inputs.callback_url()).await.into_result()?;
    Ok(attempts)
}

/// Runs the action against the process environment.
pub async fn run(config: &Config) -> Result<()> {
    let inputs = Inputs::from_env()?;
    let context = RunContext::from_env()?;
    let dispatcher = build_dispatcher(config)?;

    dispatch_result(&dispatcher, &inputs, &context).await?;
    Ok(())
}
