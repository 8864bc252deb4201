//! Structured logging setup.
//!
//! The library only emits `tracing` events: `info` per replay run, `debug`
//! per statement and snapshot, `warn` for malformed statements and `trace`
//! for individual graph edits. Binaries install a subscriber with
//! [`init_logging`]. Output goes to stderr so stdout stays usable for
//! command output.
//!
//! # Environment variables
//!
//! - `ERDREPLAY_LOG_LEVEL`: level when none is passed (trace|debug|info|warn|error|off)
//! - `RUST_LOG`: full filter directives, e.g. `info,erdreplay::render=trace`
//! - `ERDREPLAY_LOG_FORMAT`: format when none is passed (compact|pretty|json)

use std::str::FromStr;

use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Single line per event
    Compact,
    /// Multi-line with colors and source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Build the level filter. `RUST_LOG` directives win over a plain level.
fn build_filter(level: &str) -> EnvFilter {
    if level == "off" {
        return EnvFilter::new("off");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// `level` falls back to `ERDREPLAY_LOG_LEVEL`, then `RUST_LOG`, then
/// `info`. `format` falls back to `ERDREPLAY_LOG_FORMAT`, then `compact`.
/// Fails on an unknown format or if a subscriber is already installed.
pub fn init_logging(level: Option<&str>, format: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = level
        .map(|s| s.to_string())
        .or_else(|| std::env::var("ERDREPLAY_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    let log_format = format
        .map(|s| s.to_string())
        .or_else(|| std::env::var("ERDREPLAY_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());

    let filter = build_filter(&log_level);
    let format = LogFormat::from_str(&log_format).map_err(|e| format!("Invalid log format: {}", e))?;

    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_level(true)
                        .with_span_events(FmtSpan::NONE)
                        .compact(),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .json(),
                )
                .try_init()?;
        }
    }

    Ok(())
}
