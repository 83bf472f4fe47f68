//! Structured logging for cw-core.
//!
//! - stdout is reserved for command payloads (JSON/summary/markdown)
//! - stderr receives all log output, human or JSONL
//! - every event carries the run id set on the root span

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber. Call once, before any logging.
///
/// `RUST_LOG`, when set, replaces the filter derived from `config`.
/// A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(config.source_location())
                .with_line_number(config.source_location())
                .with_ansi(use_ansi);

            if config.timestamps() {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_file(config.source_location())
                .with_line_number(config.source_location())
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "logging already initialized");
    }
}

/// Unique id for this invocation: `run-` plus 12 hex characters.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}
