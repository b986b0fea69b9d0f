//! Tracing subscriber setup.
//!
//! On a GitHub Actions runner, log lines are emitted as workflow commands so
//! warnings and errors show up as annotations on the run.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        format::{self, FormatEvent, FormatFields},
        FmtContext,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `github` on an Actions runner, `pretty` elsewhere.
    #[default]
    Auto,
    /// Human-readable text.
    Pretty,
    /// One JSON object per line.
    Json,
    /// GitHub workflow commands (`::warning::`, `::error::`, ...).
    Github,
}

impl LogFormat {
    /// Resolves `Auto` from the `GITHUB_ACTIONS` marker variable.
    pub fn resolve(self, github_actions: Option<&str>) -> Self {
        match self {
            Self::Auto if github_actions == Some("true") => Self::Github,
            Self::Auto => Self::Pretty,
            other => other,
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(format: LogFormat, default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let github_actions = std::env::var("GITHUB_ACTIONS").ok();
    let registry = tracing_subscriber::registry().with(filter);

    // try_init: a subscriber may already be installed when embedded in tests
    let _ = match format.resolve(github_actions.as_deref()) {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Github => registry
            .with(tracing_subscriber::fmt::layer().event_format(WorkflowCommandFormat))
            .try_init(),
        LogFormat::Pretty | LogFormat::Auto => {
            registry.with(tracing_subscriber::fmt::layer().with_target(false)).try_init()
        },
    };
}

/// Formats events as GitHub workflow commands.
///
/// ERROR and WARN become `::error::` / `::warning::` annotations, DEBUG and
/// TRACE become `::debug::` (shown only with step debug logging enabled) and
/// INFO is printed as plain output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.format_fields(format::Writer::new(&mut message), event)?;

        match command_for(*event.metadata().level()) {
            Some(command) => writeln!(writer, "::{command}::{}", escape_data(&message)),
            None => writeln!(writer, "{message}"),
        }
    }
}

fn command_for(level: Level) -> Option<&'static str> {
    match level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        Level::INFO => None,
        _ => Some("debug"),
    }
}

/// Escapes a workflow command message so it stays on one line.
pub fn escape_data(message: &str) -> String {
    message.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_workflow_commands(emit: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(WorkflowCommandFormat)
                .with_writer(move || writer.clone()),
        );

        tracing::subscriber::with_default(subscriber, emit);
        capture.contents()
    }

    #[test]
    fn levels_map_to_workflow_commands() {
        let output = capture_workflow_commands(|| {
            tracing::info!("Posting result to http://x");
            tracing::warn!("Attempt 1 failed: boom");
            tracing::error!("Failed to post result after 3 attempts");
            tracing::debug!("Payload: {{}}");
        });

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Posting result to http://x",
                "::warning::Attempt 1 failed: boom",
                "::error::Failed to post result after 3 attempts",
                "::debug::Payload: {}",
            ]
        );
    }

    #[test]
    fn structured_fields_are_appended() {
        let output = capture_workflow_commands(|| {
            tracing::warn!(attempt = 2, "Attempt failed");
        });

        assert_eq!(output.trim_end(), "::warning::Attempt failed attempt=2");
    }

    #[test]
    fn multiline_messages_are_escaped() {
        assert_eq!(escape_data("a\nb\r\n100%"), "a%0Ab%0D%0A100%25");
    }

    #[test]
    fn auto_resolves_from_runner_marker() {
        assert_eq!(LogFormat::Auto.resolve(Some("true")), LogFormat::Github);
        assert_eq!(LogFormat::Auto.resolve(None), LogFormat::Pretty);
        assert_eq!(LogFormat::Json.resolve(Some("true")), LogFormat::Json);
    }
}
