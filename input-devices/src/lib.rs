//! Input device collaborators for inputcast.
//!
//! This crate knows how to find input devices and read raw events from them,
//! and nothing about what those events mean. Every source implements
//! [`InputDevice`]: a lazy, order-preserving stream of [`RawEvent`]s that ends
//! with an error when the device goes away, plus a `close` that releases the
//! underlying handle immediately.
//!
//! Two sources are provided:
//!
//! - [`backends::linux`] (Linux only): evdev character devices under
//!   `/dev/input`, with the keyboard/mouse selection policy in [`discover`].
//! - [`VirtualDevice`]: an in-memory device fed through a
//!   [`VirtualDeviceHandle`], for synthetic input and tests.
//!
//! Opening `/dev/input/event*` normally requires root or membership in the
//! `input` group; checking that is left to the caller.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # async fn demo() {
//! use input_devices::{backends::linux, InputDevice};
//!
//! for mut device in linux::discover() {
//!     println!("{} at {}", device.info().name, device.info().path.display());
//!     if let Ok(event) = device.next_event().await {
//!         println!("{event:?}");
//!     }
//! }
//! # }
//! ```
//!
//! [`RawEvent`]: input_protocol::RawEvent
//! [`discover`]: backends::linux::discover

pub mod backends;
mod device;
mod error;
mod virtual_device;

pub use device::{Capabilities, DeviceInfo, DeviceKind, InputDevice};
pub use error::{DeviceError, Result};
pub use virtual_device::{VirtualDevice, VirtualDeviceHandle};
