//! Logging setup for inputcast processes
//!
//! Installs a `tracing-subscriber` registry in one of three modes. Libraries
//! in the workspace only emit through `tracing`; the binary decides here where
//! that output goes.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No output
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

impl std::str::FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silent" => Ok(LoggingMode::Silent),
            "development" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidEnv(format!(
                "INPUTCAST_LOG_MODE={other} (expected silent, development or debug)"
            ))),
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Initialize logging with the specified mode
///
/// `level` is a filter directive that overrides the environment. With `None`
/// the filter comes from the environment, falling back to the mode's own
/// default (`info` for Development, `debug` for Debug).
///
/// # Environment Variables
///
/// - `INPUTCAST_LOG_LEVEL`: filter directive, e.g. `debug` or `broadcast_server=trace`
/// - `RUST_LOG`: used when `INPUTCAST_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode, level: Option<&str>) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(level, "info")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(level, "debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `INPUTCAST_LOG_MODE`
///
/// Unset means Development; an unrecognised value is an error.
pub fn init_logging_from_env(level: Option<&str>) -> Result<(), LoggingError> {
    let mode = match std::env::var("INPUTCAST_LOG_MODE") {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::Development,
    };

    init_logging(mode, level)
}

fn create_env_filter(level: Option<&str>, mode_default: &str) -> Result<EnvFilter, LoggingError> {
    let directive = filter_directive(
        level,
        std::env::var("INPUTCAST_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
        mode_default,
    );

    EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidEnv(format!("log filter '{directive}': {e}")))
}

/// Explicit level, then `INPUTCAST_LOG_LEVEL`, then `RUST_LOG`, then the mode default.
fn filter_directive(
    level: Option<&str>,
    inputcast_log_level: Option<String>,
    rust_log: Option<String>,
    mode_default: &str,
) -> String {
    level
        .map(str::to_string)
        .or(inputcast_log_level)
        .or(rust_log)
        .unwrap_or_else(|| mode_default.to_string())
}

/// Check if a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
