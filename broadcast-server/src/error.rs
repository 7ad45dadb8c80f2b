//! Error types for the broadcast server crate.

use std::net::SocketAddr;

/// Errors reported by a [`Subscriber`](crate::Subscriber) when a message
/// cannot be delivered. Any error evicts the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The peer is gone
    #[error("Subscriber disconnected")]
    Disconnected,

    /// The transport refused the message
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors from hub operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The hub has been closed and accepts no new subscribers
    #[error("Broadcast hub is closed")]
    Closed,

    /// The event could not be serialized
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the websocket server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No port in the configured range could be bound
    #[error("No available port found in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },

    /// Binding the chosen address failed
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Invalid server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port range: start {start} is greater than end {end}")]
    InvalidPortRange { start: u16, end: u16 },

    #[error("{0} must be greater than 0")]
    Zero(&'static str),
}

/// Convenience type alias for Results using ServerError.
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(DeliveryError::Disconnected.to_string(), "Subscriber disconnected");
        assert_eq!(
            DeliveryError::Transport("broken pipe".to_string()).to_string(),
            "Transport error: broken pipe"
        );
        assert_eq!(HubError::Closed.to_string(), "Broadcast hub is closed");
        assert_eq!(
            ServerError::NoAvailablePort {
                start: 16899,
                end: 16900
            }
            .to_string(),
            "No available port found in range 16899-16900"
        );
        assert_eq!(
            ConfigError::Zero("Max subscribers").to_string(),
            "Max subscribers must be greater than 0"
        );
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let error: ServerError = ConfigError::InvalidPortRange { start: 2, end: 1 }.into();
        match error {
            ServerError::Configuration(e) => {
                assert_eq!(e.to_string(), "Invalid port range: start 2 is greater than end 1");
            }
            _ => panic!("Expected Configuration variant"),
        }
    }
}
