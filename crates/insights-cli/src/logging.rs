//! Structured logging for the insights CLI
//!
//! Features:
//! - Human-readable console logging for interactive runs
//! - Structured JSON logging for scheduled batch runs
//! - Daily rolling log files
//! - Run ID on every event through the run span

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

pub const LOG_FILE_PREFIX: &str = "retail-insights.log";

/// Log format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format (structured logging)
    Json,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stdout only
    Stdout,
    /// Log to file only
    File,
    /// Log to both stdout and file
    Both,
}

impl LogOutput {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            _ => LogOutput::Stdout,
        }
    }
}

/// Initialize the logging system
///
/// `config.level` takes any `EnvFilter` directive, e.g. `"debug"` or
/// `"info,insights_pipeline=debug"`.
///
/// Examples:
/// ```bash
/// # Interactive: pretty console output at debug level
/// RUST_LOG=debug insights run
///
/// # Scheduled: JSON to file
/// LOG_FORMAT=json LOG_OUTPUT=file LOG_DIR=/var/log/insights insights run
/// ```
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let format = LogFormat::from_name(&config.format);
    let output = LogOutput::from_name(&config.output);

    let env_filter = EnvFilter::try_new(&config.level)
        .or_else(|_| EnvFilter::try_new("info"))?
        // DuckDB bindings are noisy at debug
        .add_directive("duckdb=warn".parse()?);

    let stdout_layer = match format {
        LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    match output {
        LogOutput::Stdout => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .try_init()?;
        }
        LogOutput::File => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer(&config.directory, format)?)
                .try_init()?;
        }
        LogOutput::Both => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer(&config.directory, format)?)
                .try_init()?;
        }
    }

    tracing::debug!(format = ?format, output = ?output, level = %config.level, "Logging initialized");
    Ok(())
}

fn file_layer<S>(directory: &str, format: LogFormat) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    std::fs::create_dir_all(directory)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, directory, LOG_FILE_PREFIX);

    let layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(appender)
            .boxed(),
        LogFormat::Pretty | LogFormat::Compact => fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .boxed(),
    };
    Ok(layer)
}

/// Helper macro for logging with structured fields
///
/// Usage:
/// ```ignore
/// log_event!(
///     level: tracing::Level::INFO,
///     event: "phase_completed",
///     phase: "analyze",
///     artifacts: 19
/// );
/// ```
#[macro_export]
macro_rules! log_event {
    (level: $level:expr, event: $event:expr $(, $key:ident: $value:expr)* $(,)?) => {
        tracing::event!(
            $level,
            event = $event
            $(, $key = ?$value)*
        );
    };
}
