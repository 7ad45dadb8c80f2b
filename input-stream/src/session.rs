//! Capture sessions: devices in, broadcast hub out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use broadcast_server::BroadcastHub;
use input_devices::InputDevice;
use input_protocol::RawEvent;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::monitor::{stop_requested, DeviceMonitor, MonitorExit, MonitorReport};
use crate::tracker::{InputStateTracker, SessionState};

/// Lifecycle of a [`Session`]. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A [`ShutdownHandle`] was triggered
    Requested,
    /// Every device monitor exited
    AllDevicesLost,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Requested => write!(f, "shutdown requested"),
            StopReason::AllDevicesLost => write!(f, "all input devices lost"),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub reason: StopReason,
    /// Input state at the moment the session stopped
    pub state: SessionState,
    /// Normalized events handed to the hub
    pub events_published: u64,
}

/// Requests that a running session stop. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    signal: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.signal.borrow()
    }
}

/// Owns the devices of one capture run and routes their events to a hub.
///
/// `run` starts one [`DeviceMonitor`] per device and a single pipeline task
/// that owns the [`InputStateTracker`]; every raw event is translated there and
/// published to the [`BroadcastHub`]. A device that fails is dropped and the
/// session carries on. The session ends when its [`ShutdownHandle`] fires or
/// when no device is left, after which the hub is closed.
///
/// # Example
///
/// ```no_run
/// use broadcast_server::{BroadcastHub, HubConfig};
/// use input_devices::{InputDevice, VirtualDevice};
/// use input_stream::{Session, SessionConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let hub = BroadcastHub::new(HubConfig::default());
///     let session = Session::new(SessionConfig::default(), hub);
///
///     let (device, _handle) = VirtualDevice::new("synthetic", 64);
///     let devices: Vec<Box<dyn InputDevice>> = vec![Box::new(device)];
///
///     let stop = session.shutdown_handle();
///     tokio::spawn(async move {
///         let _ = tokio::signal::ctrl_c().await;
///         stop.shutdown();
///     });
///
///     let report = session.run(devices).await.unwrap();
///     println!("Stopped: {} ({} events)", report.reason, report.events_published);
/// }
/// ```
pub struct Session {
    config: SessionConfig,
    hub: BroadcastHub,
    phase: watch::Sender<SessionPhase>,
    shutdown: Arc<watch::Sender<bool>>,
    started: AtomicBool,
}

impl Session {
    pub fn new(config: SessionConfig, hub: BroadcastHub) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Idle);
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            hub,
            phase,
            shutdown: Arc::new(shutdown),
            started: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Observe phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            signal: Arc::clone(&self.shutdown),
        }
    }

    /// Run the session to completion. May be called once.
    pub async fn run(&self, devices: Vec<Box<dyn InputDevice>>) -> Result<SessionReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyStarted);
        }
        if let Err(e) = self.config.validate() {
            self.set_phase(SessionPhase::Stopped);
            return Err(e.into());
        }
        if devices.is_empty() {
            self.set_phase(SessionPhase::Stopped);
            return Err(SessionError::NoDevices);
        }

        let device_count = devices.len();
        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer_size);

        let mut monitors = JoinSet::new();
        for device in devices {
            let monitor = DeviceMonitor::new(device, event_tx.clone(), self.shutdown.subscribe());
            monitors.spawn(monitor.run());
        }
        // Monitors hold the only senders; the pipeline ends when they are gone
        drop(event_tx);

        let tracker = InputStateTracker::new().with_key_repeat(self.config.forward_key_repeat);
        let pipeline = tokio::spawn(run_pipeline(tracker, event_rx, self.hub.clone()));

        self.set_phase(SessionPhase::Running);
        info!("Session running with {} input devices", device_count);

        let mut shutdown = self.shutdown.subscribe();
        let reason = loop {
            tokio::select! {
                biased;
                _ = stop_requested(&mut shutdown) => break StopReason::Requested,
                joined = monitors.join_next() => match joined {
                    Some(joined) => {
                        log_monitor_exit(joined);
                        if !monitors.is_empty() {
                            info!("{} input devices still active", monitors.len());
                        }
                    }
                    None => break StopReason::AllDevicesLost,
                },
            }
        };

        match reason {
            StopReason::Requested => info!("Shutdown requested, stopping session"),
            StopReason::AllDevicesLost => error!("All input devices lost, stopping session"),
        }

        self.set_phase(SessionPhase::Stopping);
        self.shutdown.send_replace(true);

        let shutdown_timeout = self.config.shutdown_timeout;
        let drained = tokio::time::timeout(shutdown_timeout, async {
            while let Some(joined) = monitors.join_next().await {
                log_monitor_exit(joined);
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                "{} device monitors still running after {:?}, aborting",
                monitors.len(),
                shutdown_timeout
            );
            // Aborted monitors skip close(); dropping their device releases it
            monitors.shutdown().await;
        }

        let outcome = pipeline.await;
        self.hub.close_all();
        self.set_phase(SessionPhase::Stopped);

        let (state, events_published) =
            outcome.map_err(|e| SessionError::Pipeline(e.to_string()))?;
        info!(
            "Session stopped ({}), {} events published",
            reason, events_published
        );

        Ok(SessionReport {
            reason,
            state,
            events_published,
        })
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase.send_replace(phase);
        debug!("Session phase: {:?}", phase);
    }
}

/// Single consumer of raw events: owns the tracker, publishes to the hub.
async fn run_pipeline(
    mut tracker: InputStateTracker,
    mut events: mpsc::Receiver<RawEvent>,
    hub: BroadcastHub,
) -> (SessionState, u64) {
    let mut published = 0u64;

    while let Some(raw) = events.recv().await {
        let Some(event) = tracker.apply(&raw) else {
            continue;
        };

        match hub.publish(&event) {
            Ok(subscribers) => {
                published += 1;
                trace!(
                    event_type = event.event_type(),
                    "Published to {} subscribers",
                    subscribers
                );
            }
            Err(e) => warn!("Failed to publish {} event: {}", event.event_type(), e),
        }
    }

    (tracker.into_state(), published)
}

fn log_monitor_exit(joined: std::result::Result<MonitorReport, JoinError>) {
    match joined {
        Ok(report) => match report.exit {
            MonitorExit::Failed(e) => warn!(
                device = %report.device.path.display(),
                "Lost device {}: {}",
                report.device.name,
                e
            ),
            MonitorExit::Stopped | MonitorExit::PipelineClosed => debug!(
                device = %report.device.path.display(),
                "Stopped monitoring {}",
                report.device.name
            ),
        },
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!("Device monitor task failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadcast_server::HubConfig;

    #[test]
    fn test_phase_order() {
        assert!(SessionPhase::Idle < SessionPhase::Running);
        assert!(SessionPhase::Running < SessionPhase::Stopping);
        assert!(SessionPhase::Stopping < SessionPhase::Stopped);
    }

    #[test]
    fn test_shutdown_handle_is_shared() {
        let session = Session::new(SessionConfig::default(), BroadcastHub::new(HubConfig::default()));
        let first = session.shutdown_handle();
        let second = first.clone();

        assert!(!second.is_shutdown());
        first.shutdown();
        assert!(second.is_shutdown());
        assert!(session.shutdown_handle().is_shutdown());
    }

    #[tokio::test]
    async fn test_run_without_devices_fails() {
        let session = Session::new(SessionConfig::default(), BroadcastHub::new(HubConfig::default()));

        let result = session.run(Vec::new()).await;
        assert!(matches!(result, Err(SessionError::NoDevices)));
        assert_eq!(session.phase(), SessionPhase::Stopped);

        let again = session.run(Vec::new()).await;
        assert!(matches!(again, Err(SessionError::AlreadyStarted)));
    }
}
