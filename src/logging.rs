//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and, optionally, to
//! JSON log files: a daily-rolling `combined.log` with every event and an
//! `error.log` with errors only.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

static LOGGER_INITIALIZED: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs anything. The
/// file writer guards live in a static so buffered events are flushed for
/// the life of the process.
pub fn init_structured_logging(config: &LoggingConfig, environment: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let directive = resolve_directive(
            std::env::var("RUST_LOG").ok(),
            config.level.as_deref(),
            environment,
        );

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guards = Vec::new();

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);
        if config.json_console {
            layers.push(console.json().with_filter(env_filter(&directive)).boxed());
        } else {
            layers.push(
                console
                    .with_ansi(true)
                    .with_filter(env_filter(&directive))
                    .boxed(),
            );
        }

        let log_dir = Path::new(&config.directory);
        let file_error = if config.file_output {
            match fs::create_dir_all(log_dir) {
                Ok(()) => {
                    let (combined, combined_guard) = tracing_appender::non_blocking(
                        tracing_appender::rolling::daily(log_dir, "combined.log"),
                    );
                    let (errors, errors_guard) = tracing_appender::non_blocking(
                        tracing_appender::rolling::daily(log_dir, "error.log"),
                    );
                    guards.push(combined_guard);
                    guards.push(errors_guard);

                    layers.push(
                        fmt::layer()
                            .with_writer(combined)
                            .with_target(true)
                            .with_ansi(false)
                            .json()
                            .with_filter(env_filter(&directive))
                            .boxed(),
                    );
                    layers.push(
                        fmt::layer()
                            .with_writer(errors)
                            .with_target(true)
                            .with_ansi(false)
                            .json()
                            .with_filter(LevelFilter::ERROR)
                            .boxed(),
                    );
                    None
                }
                Err(e) => Some(e.to_string()),
            }
        } else {
            None
        };

        // Use try_init to avoid panic if global subscriber already set
        if tracing_subscriber::registry().with(layers).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        if let Some(error) = file_error {
            tracing::warn!(
                directory = %log_dir.display(),
                error = %error,
                "Could not create log directory, logging to console only"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            filter = %directive,
            file_output = config.file_output && guards.len() == 2,
            "Structured logging initialized"
        );

        guards
    });
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// `RUST_LOG` wins, then the configured level, then the environment default
fn resolve_directive(rust_log: Option<String>, configured: Option<&str>, environment: &str) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| get_log_level(environment).to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "Operation failed"
    );
}
