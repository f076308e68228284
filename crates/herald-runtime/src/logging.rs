//! Logging setup.
//!
//! Herald logs through `tracing`; this module installs a `tracing-subscriber`
//! registry shaped by the `[logging]` section of the configuration.
//!
//! ```rust,ignore
//! use herald_runtime::config::load_config;
//! use herald_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-module
//! `filters` are applied on top of either.

use std::path::Path;

use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = try_init_from_config(config);
}

/// Installs the global subscriber described by `config`.
pub fn try_init_from_config(config: &LoggingConfig) -> Result<(), TryInitError> {
    let layer = match config.output {
        LogOutput::Stdout => fmt_layer(config, std::io::stdout),
        LogOutput::Stderr => fmt_layer(config, std::io::stderr),
        LogOutput::File => match file_appender(config) {
            Some(appender) => fmt_layer(config, appender),
            None => fmt_layer(config, std::io::stdout),
        },
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(build_filter(config))
        .try_init()
}

fn fmt_layer<W>(config: &LoggingConfig, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_span_events(fmt_span(&config.span_events))
        .with_thread_ids(config.thread_ids)
        .with_file(config.file_location)
        .with_line_number(config.file_location);

    match config.format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Full => layer.boxed(),
        #[cfg(feature = "json-log")]
        LogFormat::Json => layer.json().boxed(),
        #[cfg(not(feature = "json-log"))]
        LogFormat::Json => layer.boxed(),
    }
}

fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    let mut span = FmtSpan::NONE;
    if events.new {
        span |= FmtSpan::NEW;
    }
    if events.enter {
        span |= FmtSpan::ENTER;
    }
    if events.exit {
        span |= FmtSpan::EXIT;
    }
    if events.close {
        span |= FmtSpan::CLOSE;
    }
    span
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    for (module, level) in &config.filters {
        let directive = format!("{module}={level}");
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => warn!(%directive, error = %e, "Ignoring invalid log filter"),
        }
    }
    filter
}

/// Opens the rolling log file, or `None` (with a warning) if it cannot be
/// created.
fn file_appender(config: &LoggingConfig) -> Option<RollingFileAppender> {
    let path = config.file_path.as_deref()?;
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("herald.log");
    let rotation = match config.rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .max_log_files(config.max_files.max(1))
        .build(directory)
        .inspect_err(|e| warn!(error = %e, "Failed to open log file, falling back to stdout"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_span_events() {
        let lifecycle = SpanEventConfig {
            new: true,
            close: true,
            ..Default::default()
        };
        assert_eq!(fmt_span(&lifecycle), FmtSpan::NEW | FmtSpan::CLOSE);
        assert_eq!(fmt_span(&SpanEventConfig::default()), FmtSpan::NONE);
    }

    #[test]
    fn test_module_filters_become_directives() {
        let mut config = LoggingConfig::default();
        config
            .filters
            .insert("herald_framework".into(), LogLevel::Trace);

        let filter = build_filter(&config).to_string();
        assert!(filter.contains("herald_framework=trace"), "{filter}");
    }

    #[test]
    fn test_file_output_without_path() {
        let config = LoggingConfig {
            output: LogOutput::File,
            ..Default::default()
        };
        assert!(file_appender(&config).is_none());
    }
}
