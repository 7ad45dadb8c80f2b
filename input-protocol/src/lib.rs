//! Input event vocabulary for inputcast.
//!
//! This crate holds both sides of the translation performed by the capture
//! pipeline, and nothing that touches a device or a socket:
//!
//! - [`RawEvent`]: a device-native `{type, code, value}` triple as produced by
//!   the Linux input subsystem, plus the native code constants the pipeline
//!   cares about ([`native`]).
//! - [`keymap`]: the static tables mapping native key and mouse-button codes to
//!   the libuiohook protocol vocabulary.
//! - [`NormalizedEvent`]: the closed set of protocol events delivered to
//!   subscribers, together with its JSON wire form.
//!
//! # Example
//!
//! ```
//! use input_protocol::{keymap, native, KeyCode, NormalizedEvent};
//!
//! let code = keymap::translate_key(native::KEY_A).unwrap();
//! assert_eq!(code, KeyCode::new(0x1e));
//!
//! let event = NormalizedEvent::KeyPressed { code };
//! assert_eq!(event.to_json().unwrap(), r#"{"event_type":"key_pressed","keycode":30}"#);
//! ```

mod event;
pub mod keymap;
pub mod native;
mod raw;

pub use event::{ButtonMask, KeyCode, NormalizedEvent, WheelAxis};
pub use keymap::MouseButton;
pub use raw::{EventKind, KeyState, RawEvent};
