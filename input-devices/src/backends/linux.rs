//! evdev backend: `/dev/input/event*` character devices.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use evdev::{Device, EventStream, EventType, Key};
use input_protocol::RawEvent;
use tracing::{debug, info, warn};

use crate::device::{Capabilities, DeviceInfo, InputDevice};
use crate::error::{DeviceError, Result};

/// An opened evdev device streaming events asynchronously.
pub struct EvdevDevice {
    info: DeviceInfo,
    stream: Option<EventStream>,
}

impl EvdevDevice {
    /// Open a specific device node, regardless of the discovery policy.
    ///
    /// Fails with [`DeviceError::Unsupported`] if the device reports neither
    /// keyboard keys, mouse buttons nor relative axes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = Device::open(&path).map_err(|source| DeviceError::Open {
            path: path.clone(),
            source,
        })?;
        let info = describe(&path, &device).ok_or(DeviceError::Unsupported { path: path.clone() })?;
        Self::from_device(info, device)
    }

    fn from_device(info: DeviceInfo, device: Device) -> Result<Self> {
        let stream = device
            .into_event_stream()
            .map_err(|source| DeviceError::Open {
                path: info.path.clone(),
                source,
            })?;

        Ok(Self {
            info,
            stream: Some(stream),
        })
    }
}

#[async_trait]
impl InputDevice for EvdevDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    async fn next_event(&mut self) -> Result<RawEvent> {
        let stream = self.stream.as_mut().ok_or(DeviceError::Closed)?;
        let event = stream.next_event().await.map_err(|source| DeviceError::Read {
            path: self.info.path.clone(),
            source,
        })?;

        Ok(RawEvent::new(event.event_type().0, event.code(), event.value()))
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!(device = %self.info.path.display(), "Closed evdev device");
        }
    }
}

/// Read the capabilities the pipeline cares about from an evdev device.
pub fn capabilities(device: &Device) -> Capabilities {
    let keys = device.supported_keys();
    Capabilities {
        keyboard_keys: keys.map_or(false, |keys| keys.contains(Key::KEY_A)),
        mouse_buttons: keys.map_or(false, |keys| keys.contains(Key::BTN_LEFT)),
        relative_axes: device.supported_events().contains(EventType::RELATIVE),
    }
}

fn describe(path: &Path, device: &Device) -> Option<DeviceInfo> {
    let capabilities = capabilities(device);
    let kind = capabilities.classify()?;
    let name = device.name().unwrap_or("unknown device");
    Some(DeviceInfo::new(name, path, kind, capabilities))
}

/// List capturable devices without opening event streams.
///
/// Devices the process is not allowed to open are silently absent.
pub fn list() -> Vec<DeviceInfo> {
    let mut found: Vec<DeviceInfo> = evdev::enumerate()
        .filter_map(|(path, device)| describe(&path, &device))
        .collect();
    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

/// Find and open every keyboard, mouse and pointer device.
///
/// A device that is found but whose event stream cannot be set up is skipped
/// with a warning; discovery itself never fails.
pub fn discover() -> Vec<EvdevDevice> {
    let candidates: Vec<(PathBuf, Device)> = evdev::enumerate().collect();
    info!("Found {} input devices", candidates.len());

    let mut selected = Vec::new();
    for (path, device) in candidates {
        let Some(info) = describe(&path, &device) else {
            debug!(device = %path.display(), "Skipping device without key or motion capabilities");
            continue;
        };

        info!("Found {}: {} at {}", info.kind, info.name, path.display());
        match EvdevDevice::from_device(info, device) {
            Ok(device) => selected.push(device),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    selected
}
