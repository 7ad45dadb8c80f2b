//! Configuration types for the input-stream crate
//!
//! Controls how a capture session buffers raw events, whether key auto-repeat
//! is forwarded, and how long shutdown waits for device monitors.

use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a capture [`Session`](crate::Session)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the channel between device monitors and the event pipeline.
    /// A full channel suspends the monitors, never the pipeline.
    /// Default: 1024
    pub event_buffer_size: usize,

    /// Emit `KeyTyped` for key auto-repeat instead of dropping it
    /// Default: false
    pub forward_key_repeat: bool,

    /// How long Stopping waits for device monitors before aborting them
    /// Default: 2 seconds
    pub shutdown_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1024,
            forward_key_repeat: false,
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward key repeats as `KeyTyped` events
    pub fn typing() -> Self {
        Self {
            forward_key_repeat: true,
            ..Default::default()
        }
    }

    /// Small buffers and a short shutdown bound, for tests and embedding
    pub fn lightweight() -> Self {
        Self {
            event_buffer_size: 64,
            shutdown_timeout: Duration::from_millis(250),
            ..Default::default()
        }
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    pub fn with_forward_key_repeat(mut self, enabled: bool) -> Self {
        self.forward_key_repeat = enabled;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.shutdown_timeout == Duration::ZERO {
            return Err(ConfigError::Invalid(
                "Shutdown timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
