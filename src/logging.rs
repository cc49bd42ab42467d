//! Structured logging setup.
//!
//! Every request line carries `request_id`, `method`, `path`, `status` and
//! `latency_ms` fields, so JSON output is the default. Pretty output is meant
//! for a terminal during development.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Write through a background thread instead of stdout directly
    pub async_logging: bool,
    /// Extra comma-separated `EnvFilter` directives
    pub target_filter: Option<String>,
    /// Include file:line in every event
    pub include_location: bool,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl LogConfig {
    /// Read `SILODASH_LOG_*` variables, falling back to production defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default_prod();
        Self {
            log_level: env::var("SILODASH_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("SILODASH_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: env_flag("SILODASH_LOG_ASYNC", defaults.async_logging),
            target_filter: env::var("SILODASH_LOG_TARGET_FILTER").ok(),
            include_location: env_flag(
                "SILODASH_LOG_INCLUDE_LOCATION",
                defaults.include_location,
            ),
        }
    }

    pub fn default_prod() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: true,
            target_filter: None,
            include_location: false,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        // Client disconnects are reported by may_minihttp at info/debug.
        if let Ok(directive) = "may_minihttp=warn".parse() {
            filter = filter.add_directive(directive);
        }

        if let Some(targets) = &self.target_filter {
            for raw in targets.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match raw.parse() {
                    Ok(directive) => filter = filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {raw}"),
                }
            }
        }
        filter
    }
}

/// Install the global subscriber.
///
/// With `async_logging` the returned guard owns the writer thread; keep it
/// alive for the life of the process or buffered lines are lost.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (nb, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(nb), Some(guard))
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
