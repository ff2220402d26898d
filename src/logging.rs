//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with either JSON output (for
//! production) or pretty-printed output (for TTY / local dev). Format
//! is auto-detected from the terminal but can be forced via `--json`
//! or `--pretty`. With the `sentry-integration` feature, warnings and
//! errors (including exhausted partner deliveries) are also forwarded
//! to Sentry.

use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let filter = Targets::new().with_default(level.to_tracing_level());

    let registry = tracing_subscriber::registry().with(filter);

    #[cfg(feature = "sentry-integration")]
    let registry = registry.with(sentry_tracing::layer());

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().pretty()).init();
        }
    }
}
