//! One long-lived reader per input device.

use input_devices::{DeviceError, DeviceInfo, InputDevice};
use input_protocol::RawEvent;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Why a [`DeviceMonitor`] stopped reading.
#[derive(Debug)]
pub enum MonitorExit {
    /// Shutdown was signalled
    Stopped,
    /// The device failed or disappeared
    Failed(DeviceError),
    /// Nothing is consuming raw events any more
    PipelineClosed,
}

/// Outcome of a finished [`DeviceMonitor`].
#[derive(Debug)]
pub struct MonitorReport {
    pub device: DeviceInfo,
    pub events_read: u64,
    pub exit: MonitorExit,
}

/// Pulls raw events from one device and forwards them to the event pipeline.
///
/// The monitor stops when the shutdown flag is raised, when the device fails,
/// or when the pipeline goes away. A pending device read is abandoned as soon
/// as shutdown is signalled. The device is closed on every exit path.
pub struct DeviceMonitor {
    device: Box<dyn InputDevice>,
    sink: mpsc::Sender<RawEvent>,
    shutdown: watch::Receiver<bool>,
}

impl DeviceMonitor {
    pub fn new(
        device: Box<dyn InputDevice>,
        sink: mpsc::Sender<RawEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            device,
            sink,
            shutdown,
        }
    }

    pub fn info(&self) -> &DeviceInfo {
        self.device.info()
    }

    pub async fn run(self) -> MonitorReport {
        let DeviceMonitor {
            mut device,
            sink,
            mut shutdown,
        } = self;
        let info = device.info().clone();
        let mut events_read = 0u64;

        info!(device = %info.path.display(), "Monitoring device: {}", info.name);

        let exit = loop {
            let read = tokio::select! {
                biased;
                _ = stop_requested(&mut shutdown) => break MonitorExit::Stopped,
                read = device.next_event() => read,
            };

            match read {
                Ok(event) => {
                    events_read += 1;
                    tokio::select! {
                        biased;
                        _ = stop_requested(&mut shutdown) => break MonitorExit::Stopped,
                        sent = sink.send(event) => {
                            if sent.is_err() {
                                break MonitorExit::PipelineClosed;
                            }
                        }
                    }
                }
                Err(e) => break MonitorExit::Failed(e),
            }
        };

        device.close();
        debug!(
            device = %info.path.display(),
            "Monitor finished after {} events: {:?}",
            events_read,
            exit
        );

        MonitorReport {
            device: info,
            events_read,
            exit,
        }
    }
}

/// Resolves once the flag is raised or its sender is gone.
pub(crate) async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use input_devices::VirtualDevice;
    use input_protocol::native;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_forwards_events_until_device_fails() {
        let (device, handle) = VirtualDevice::new("mouse", 8);
        let (sink, mut events) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);

        handle
            .send_all([
                RawEvent::relative(native::REL_X, 1),
                RawEvent::relative(native::REL_Y, 2),
            ])
            .await
            .unwrap();
        handle.fail("unplugged").await.unwrap();

        let report = DeviceMonitor::new(Box::new(device), sink, shutdown)
            .run()
            .await;

        assert_eq!(report.events_read, 2);
        assert!(matches!(report.exit, MonitorExit::Failed(DeviceError::Failed(_))));
        assert!(handle.is_closed());

        assert_eq!(events.recv().await, Some(RawEvent::relative(native::REL_X, 1)));
        assert_eq!(events.recv().await, Some(RawEvent::relative(native::REL_Y, 2)));
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_pending_read() {
        let (device, mut handle) = VirtualDevice::new("keyboard", 8);
        let (sink, _events) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);

        let task = tokio::spawn(DeviceMonitor::new(Box::new(device), sink, shutdown).run());

        // Nothing is queued, so the monitor is blocked reading
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.send_replace(true);

        let report = timeout(Duration::from_secs(1), task)
            .await
            .expect("Timeout waiting for monitor to stop")
            .unwrap();
        assert!(matches!(report.exit, MonitorExit::Stopped));
        handle.wait_closed().await;
    }

    #[tokio::test]
    async fn test_aborted_monitor_releases_device() {
        let (device, mut handle) = VirtualDevice::new("keyboard", 8);
        let (sink, _events) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);

        let task = tokio::spawn(DeviceMonitor::new(Box::new(device), sink, shutdown).run());
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        timeout(Duration::from_secs(1), handle.wait_closed())
            .await
            .expect("aborted monitor kept the device open");
        assert!(handle.send(RawEvent::relative(native::REL_X, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_exits_when_pipeline_is_gone() {
        let (device, handle) = VirtualDevice::new("mouse", 8);
        let (sink, events) = mpsc::channel(1);
        let (_stop, shutdown) = watch::channel(false);
        drop(events);

        handle
            .send(RawEvent::relative(native::REL_X, 1))
            .await
            .unwrap();

        let report = timeout(
            Duration::from_secs(1),
            DeviceMonitor::new(Box::new(device), sink, shutdown).run(),
        )
        .await
        .expect("Timeout waiting for monitor to exit");
        assert!(matches!(report.exit, MonitorExit::PipelineClosed));
    }
}
