//! Device-native input events.

use serde::{Deserialize, Serialize};

use crate::native;

/// Event class of a raw event, decoded from the native `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Synchronization marker (`EV_SYN`)
    Sync,
    /// Key or button state change (`EV_KEY`)
    Key,
    /// Relative axis motion (`EV_REL`)
    Relative,
    /// Any other event type; carried through untouched and ignored downstream
    Other(u16),
}

impl EventKind {
    /// Decode a native event type code.
    pub fn from_code(code: u16) -> Self {
        match code {
            native::EV_SYN => EventKind::Sync,
            native::EV_KEY => EventKind::Key,
            native::EV_REL => EventKind::Relative,
            other => EventKind::Other(other),
        }
    }

    /// The native event type code.
    pub fn code(&self) -> u16 {
        match self {
            EventKind::Sync => native::EV_SYN,
            EventKind::Key => native::EV_KEY,
            EventKind::Relative => native::EV_REL,
            EventKind::Other(code) => *code,
        }
    }
}

/// Interpretation of the `value` field of an `EV_KEY` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Released,
    Pressed,
    Repeat,
    /// A value outside 0..=2
    Unknown(i32),
}

impl KeyState {
    pub fn from_value(value: i32) -> Self {
        match value {
            native::KEY_VALUE_RELEASED => KeyState::Released,
            native::KEY_VALUE_PRESSED => KeyState::Pressed,
            native::KEY_VALUE_REPEAT => KeyState::Repeat,
            other => KeyState::Unknown(other),
        }
    }
}

/// One unprocessed input notification, in device-native code space.
///
/// The fields are kept opaque: any combination is representable, and
/// interpretation happens only in the state tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEvent {
    /// Native event type (`EV_*`)
    #[serde(rename = "type")]
    pub event_type: u16,
    /// Native code within the event type (`KEY_*`, `BTN_*`, `REL_*`)
    pub code: u16,
    /// Native value (key state, relative delta)
    pub value: i32,
}

impl RawEvent {
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }

    /// A key or button event.
    pub fn key(code: u16, state: KeyState) -> Self {
        let value = match state {
            KeyState::Released => native::KEY_VALUE_RELEASED,
            KeyState::Pressed => native::KEY_VALUE_PRESSED,
            KeyState::Repeat => native::KEY_VALUE_REPEAT,
            KeyState::Unknown(value) => value,
        };
        Self::new(native::EV_KEY, code, value)
    }

    /// A relative axis event.
    pub fn relative(axis: u16, delta: i32) -> Self {
        Self::new(native::EV_REL, axis, delta)
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_code(self.event_type)
    }
}
