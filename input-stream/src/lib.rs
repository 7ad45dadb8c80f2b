//! Input capture pipeline for inputcast.
//!
//! This crate turns raw device events into normalized protocol events and
//! feeds them to a [`BroadcastHub`](broadcast_server::BroadcastHub):
//!
//! ```text
//! InputDevice -> DeviceMonitor -> InputStateTracker -> BroadcastHub -> subscribers
//! ```
//!
//! - [`InputStateTracker`] owns the session's [`SessionState`] (pointer
//!   position, held buttons, held keys) and converts one raw event at a time.
//! - [`DeviceMonitor`] reads one device until it fails or shutdown is signalled.
//! - [`Session`] runs one monitor per device, funnels every raw event through a
//!   single tracker, and walks the `Idle -> Running -> Stopping -> Stopped`
//!   lifecycle.
//! - [`logging`] installs the process-wide tracing subscriber.

mod config;
mod error;
pub mod logging;
mod monitor;
mod session;
mod tracker;

pub use config::SessionConfig;
pub use error::{ConfigError, Result, SessionError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use monitor::{DeviceMonitor, MonitorExit, MonitorReport};
pub use session::{Session, SessionPhase, SessionReport, ShutdownHandle, StopReason};
pub use tracker::{InputStateTracker, SessionState};
