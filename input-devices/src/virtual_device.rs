//! In-memory input device driven through a handle.

use async_trait::async_trait;
use input_protocol::RawEvent;
use tokio::sync::{mpsc, watch};

use crate::device::{Capabilities, DeviceInfo, DeviceKind, InputDevice};
use crate::error::{DeviceError, Result};

enum Feed {
    Event(RawEvent),
    Fail(String),
}

/// An [`InputDevice`] whose events come from a [`VirtualDeviceHandle`].
///
/// Reads suspend until the handle sends something. Dropping every handle
/// makes the next read fail with [`DeviceError::Disconnected`], which is how a
/// virtual device gets "unplugged".
pub struct VirtualDevice {
    info: DeviceInfo,
    feed: mpsc::Receiver<Feed>,
    closed: watch::Sender<bool>,
}

/// Producer side of a [`VirtualDevice`].
#[derive(Clone)]
pub struct VirtualDeviceHandle {
    feed: mpsc::Sender<Feed>,
    closed: watch::Receiver<bool>,
}

impl VirtualDevice {
    /// Create a virtual device that reports keyboard and mouse capabilities.
    ///
    /// `capacity` bounds the number of injected events not yet read.
    pub fn new(name: &str, capacity: usize) -> (Self, VirtualDeviceHandle) {
        let capabilities = Capabilities {
            keyboard_keys: true,
            mouse_buttons: true,
            relative_axes: true,
        };
        let info = DeviceInfo::new(
            name,
            format!("virtual/{name}"),
            DeviceKind::Mouse,
            capabilities,
        );
        Self::with_info(info, capacity)
    }

    pub fn with_info(info: DeviceInfo, capacity: usize) -> (Self, VirtualDeviceHandle) {
        let (feed_tx, feed_rx) = mpsc::channel(capacity.max(1));
        let (closed_tx, closed_rx) = watch::channel(false);

        let device = Self {
            info,
            feed: feed_rx,
            closed: closed_tx,
        };
        let handle = VirtualDeviceHandle {
            feed: feed_tx,
            closed: closed_rx,
        };
        (device, handle)
    }
}

#[async_trait]
impl InputDevice for VirtualDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    async fn next_event(&mut self) -> Result<RawEvent> {
        if *self.closed.borrow() {
            return Err(DeviceError::Closed);
        }

        match self.feed.recv().await {
            Some(Feed::Event(event)) => Ok(event),
            Some(Feed::Fail(reason)) => Err(DeviceError::Failed(reason)),
            None => Err(DeviceError::Disconnected {
                path: self.info.path.clone(),
            }),
        }
    }

    fn close(&mut self) {
        self.feed.close();
        self.closed.send_replace(true);
    }
}

impl VirtualDeviceHandle {
    /// Inject one raw event. Fails once the device has been closed or dropped.
    pub async fn send(&self, event: RawEvent) -> Result<()> {
        self.feed
            .send(Feed::Event(event))
            .await
            .map_err(|_| DeviceError::Closed)
    }

    /// Inject a batch of raw events in order.
    pub async fn send_all(&self, events: impl IntoIterator<Item = RawEvent>) -> Result<()> {
        for event in events {
            self.send(event).await?;
        }
        Ok(())
    }

    /// Make the device's next read fail after any events already queued.
    pub async fn fail(&self, reason: &str) -> Result<()> {
        self.feed
            .send(Feed::Fail(reason.to_string()))
            .await
            .map_err(|_| DeviceError::Closed)
    }

    /// Whether the owner has closed the device.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Wait until the owner closes the device, or drops it.
    pub async fn wait_closed(&mut self) {
        let _ = self.closed.wait_for(|closed| *closed).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input_protocol::{native, KeyState};

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (mut device, handle) = VirtualDevice::new("test", 8);

        let events = [
            RawEvent::key(native::KEY_A, KeyState::Pressed),
            RawEvent::key(native::KEY_A, KeyState::Released),
        ];
        handle.send_all(events).await.unwrap();

        assert_eq!(device.next_event().await.unwrap(), events[0]);
        assert_eq!(device.next_event().await.unwrap(), events[1]);
    }

    #[tokio::test]
    async fn test_dropping_handle_disconnects() {
        let (mut device, handle) = VirtualDevice::new("test", 8);
        drop(handle);

        let result = device.next_event().await;
        assert!(matches!(result, Err(DeviceError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let (mut device, handle) = VirtualDevice::new("test", 8);
        handle.fail("cable pulled").await.unwrap();

        let result = device.next_event().await;
        assert!(matches!(result, Err(DeviceError::Failed(reason)) if reason == "cable pulled"));
    }

    #[tokio::test]
    async fn test_close_is_observed_by_handle() {
        let (mut device, mut handle) = VirtualDevice::new("test", 8);
        assert!(!handle.is_closed());

        device.close();
        handle.wait_closed().await;
        assert!(handle.is_closed());

        assert!(matches!(device.next_event().await, Err(DeviceError::Closed)));
        assert!(handle
            .send(RawEvent::relative(native::REL_X, 1))
            .await
            .is_err());
    }

    #[test]
    fn test_virtual_device_info() {
        let (device, _handle) = VirtualDevice::new("kbd", 1);
        assert_eq!(device.info().name, "kbd");
        assert_eq!(device.info().path.to_str(), Some("virtual/kbd"));
    }
}
