//! The device collaborator contract.

use std::path::PathBuf;

use async_trait::async_trait;
use input_protocol::RawEvent;

use crate::error::Result;

/// What a device can report, as far as the capture pipeline cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Reports `KEY_A`
    pub keyboard_keys: bool,
    /// Reports `BTN_LEFT`
    pub mouse_buttons: bool,
    /// Reports any relative axis (`EV_REL`)
    pub relative_axes: bool,
}

impl Capabilities {
    /// Decide whether a device with these capabilities should be captured.
    ///
    /// Mouse buttons win over keyboard keys, so a mouse exposing a few keys
    /// is still a mouse; a device with only relative axes is a pointer.
    pub fn classify(&self) -> Option<DeviceKind> {
        if self.mouse_buttons {
            Some(DeviceKind::Mouse)
        } else if self.keyboard_keys {
            Some(DeviceKind::Keyboard)
        } else if self.relative_axes {
            Some(DeviceKind::Pointer)
        } else {
            None
        }
    }
}

/// Broad class of a captured device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Keyboard,
    Mouse,
    /// Relative motion without buttons (trackballs, wheels, some touchpads)
    Pointer,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Keyboard => write!(f, "keyboard"),
            DeviceKind::Mouse => write!(f, "mouse"),
            DeviceKind::Pointer => write!(f, "pointer"),
        }
    }
}

/// Identity and capability descriptor of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub path: PathBuf,
    pub kind: DeviceKind,
    pub capabilities: Capabilities,
}

impl DeviceInfo {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        kind: DeviceKind,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            capabilities,
        }
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) at {}", self.name, self.kind, self.path.display())
    }
}

/// A source of raw input events.
///
/// `next_event` yields events in device order and suspends until one is
/// available. It must be cancel-safe: dropping the future between events loses
/// nothing. An `Err` means the device is gone and no further events follow.
#[async_trait]
pub trait InputDevice: Send {
    fn info(&self) -> &DeviceInfo;

    async fn next_event(&mut self) -> Result<RawEvent>;

    /// Release the underlying handle without draining pending events.
    ///
    /// Dropping a device must release the handle as well; a monitor that is
    /// aborted never reaches `close`.
    fn close(&mut self);
}
