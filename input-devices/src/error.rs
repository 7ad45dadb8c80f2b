//! Error types for device access.

use std::path::PathBuf;

/// Errors raised while opening or reading an input device.
///
/// Every variant is terminal for the device that raised it: the owner is
/// expected to close the device and stop reading from it.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device node could not be opened
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the next event failed (typically the device was unplugged)
    #[error("Failed to read from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The device reports none of the capabilities the pipeline consumes
    #[error("Device {path} is neither a keyboard nor a mouse")]
    Unsupported { path: PathBuf },

    /// The event source went away without an I/O error
    #[error("Device {path} disconnected")]
    Disconnected { path: PathBuf },

    /// The device was already closed by its owner
    #[error("Device is closed")]
    Closed,

    /// Failure injected into a virtual device
    #[error("Device failure: {0}")]
    Failed(String),
}

/// Convenience type alias for Results using DeviceError.
pub type Result<T> = std::result::Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let error = DeviceError::Disconnected {
            path: PathBuf::from("/dev/input/event3"),
        };
        assert_eq!(error.to_string(), "Device /dev/input/event3 disconnected");

        let error = DeviceError::Read {
            path: PathBuf::from("/dev/input/event0"),
            source: std::io::Error::from_raw_os_error(19),
        };
        assert!(error.to_string().starts_with("Failed to read from /dev/input/event0"));

        assert_eq!(DeviceError::Closed.to_string(), "Device is closed");
        assert_eq!(
            DeviceError::Failed("unplugged".to_string()).to_string(),
            "Device failure: unplugged"
        );
    }
}
