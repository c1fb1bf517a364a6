//! Structured Logger
//!
//! Wraps `tracing` with a console layer (plain or JSON), an optional daily
//! rolling NDJSON file, and environment-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Fallback filter when `RUST_LOG` is unset (e.g. "info", "broadsheet=debug").
    pub level: String,
    /// Directory for `broadsheet.log.YYYY-MM-DD`; no file output when `None`.
    pub dir: Option<PathBuf>,
    /// Emit console output as JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// Initialize the global subscriber. Later calls are no-ops.
pub fn init_logger(options: &LoggerOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let file_layer = options.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, "broadsheet.log");
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    // Console goes to stderr so stdout carries only the extracted fields.
    let (plain_layer, json_layer) = if options.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            ),
            None,
        )
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init();
}
