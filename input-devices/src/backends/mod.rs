//! Platform device backends.

#[cfg(target_os = "linux")]
pub mod linux;
