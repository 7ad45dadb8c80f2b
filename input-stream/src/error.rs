//! Error types for the input-stream crate.

/// Errors that end or prevent a capture session.
///
/// Losing a single device is not an error; losing every device ends the
/// session normally with [`StopReason::AllDevicesLost`](crate::StopReason).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session was started without any device
    #[error("No input devices to monitor")]
    NoDevices,

    /// `run` was called on a session that already ran
    #[error("Session has already been started")]
    AlreadyStarted,

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The event pipeline task ended abnormally
    #[error("Event pipeline failed: {0}")]
    Pipeline(String),
}

/// Invalid session configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
}

/// Convenience type alias for Results using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;
