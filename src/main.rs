//! Callback dispatch action.
//!
//! Entry point run by the CI job. Exits non-zero when inputs are missing,
//! the result is not JSON or the callback never accepted the payload.

use std::process::ExitCode;

use callback_dispatch::{telemetry, Config};
use tracing::error;

fn main() -> ExitCode {
    let config = Config::load();
    let (format, filter) = match &config {
        Ok(config) => (config.log_format, config.log_filter.clone()),
        Err(_) => (telemetry::LogFormat::default(), "info".to_string()),
    };
    telemetry::init_tracing(format, &filter);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        },
    };

    match runtime.block_on(callback_dispatch::run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        },
    }
}
