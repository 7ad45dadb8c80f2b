//! Normalized protocol events and their wire form.

use serde::{Deserialize, Serialize};

/// Protocol key code (libuiohook `VC_*` virtual code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(u16);

impl KeyCode {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Bitmask of currently held mouse buttons, in libuiohook bit positions.
///
/// Button `n` (zero-based) owns bit `8 + n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonMask(u16);

impl ButtonMask {
    /// Bit position of the first mouse button
    pub const FIRST_BUTTON_BIT: u16 = 8;

    pub const EMPTY: ButtonMask = ButtonMask(0);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: ButtonMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ButtonMask) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ButtonMask) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for ButtonMask {
    type Output = ButtonMask;

    fn bitor(self, rhs: ButtonMask) -> ButtonMask {
        ButtonMask(self.0 | rhs.0)
    }
}

/// Scroll wheel axis. Serialized as the libuiohook direction constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

impl WheelAxis {
    const VERTICAL_CODE: u8 = 3;
    const HORIZONTAL_CODE: u8 = 4;
}

impl From<WheelAxis> for u8 {
    fn from(axis: WheelAxis) -> u8 {
        match axis {
            WheelAxis::Vertical => WheelAxis::VERTICAL_CODE,
            WheelAxis::Horizontal => WheelAxis::HORIZONTAL_CODE,
        }
    }
}

impl TryFrom<u8> for WheelAxis {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            WheelAxis::VERTICAL_CODE => Ok(WheelAxis::Vertical),
            WheelAxis::HORIZONTAL_CODE => Ok(WheelAxis::Horizontal),
            other => Err(format!("unknown wheel direction: {other}")),
        }
    }
}

/// A protocol-space input event.
///
/// Produced by the state tracker from a single raw event and handed once to
/// the broadcast hub. On the wire each event is a flat JSON object whose
/// `event_type` field names the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum NormalizedEvent {
    KeyPressed {
        #[serde(rename = "keycode")]
        code: KeyCode,
    },
    KeyReleased {
        #[serde(rename = "keycode")]
        code: KeyCode,
    },
    /// Auto-repeat of a held key; only produced when repeat forwarding is enabled
    KeyTyped {
        #[serde(rename = "keycode")]
        code: KeyCode,
    },
    /// Absolute pointer position accumulated from relative motion
    MouseMoved { x: i64, y: i64 },
    #[serde(rename = "mouse_pressed")]
    MouseButtonPressed {
        button: u8,
        /// Button state after this press
        mask: ButtonMask,
    },
    #[serde(rename = "mouse_released")]
    MouseButtonReleased {
        button: u8,
        /// Button state after this release
        mask: ButtonMask,
    },
    MouseWheel {
        #[serde(rename = "direction")]
        axis: WheelAxis,
        /// `+1` or `-1`; the raw magnitude is discarded
        #[serde(rename = "rotation")]
        direction: i8,
    },
}

impl NormalizedEvent {
    /// The wire discriminant of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            NormalizedEvent::KeyPressed { .. } => "key_pressed",
            NormalizedEvent::KeyReleased { .. } => "key_released",
            NormalizedEvent::KeyTyped { .. } => "key_typed",
            NormalizedEvent::MouseMoved { .. } => "mouse_moved",
            NormalizedEvent::MouseButtonPressed { .. } => "mouse_pressed",
            NormalizedEvent::MouseButtonReleased { .. } => "mouse_released",
            NormalizedEvent::MouseWheel { .. } => "mouse_wheel",
        }
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_event_wire_form() {
        let event = NormalizedEvent::KeyPressed {
            code: KeyCode::new(0x1e),
        };
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(value, json!({"event_type": "key_pressed", "keycode": 30}));

        let event = NormalizedEvent::KeyReleased {
            code: KeyCode::new(0x0e5b),
        };
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(value, json!({"event_type": "key_released", "keycode": 0x0e5b}));
    }

    #[test]
    fn test_mouse_event_wire_form() {
        let moved = NormalizedEvent::MouseMoved { x: 5, y: -3 };
        assert_eq!(
            serde_json::to_value(moved).unwrap(),
            json!({"event_type": "mouse_moved", "x": 5, "y": -3})
        );

        let pressed = NormalizedEvent::MouseButtonPressed {
            button: 1,
            mask: ButtonMask::from_bits(0x300),
        };
        assert_eq!(
            serde_json::to_value(pressed).unwrap(),
            json!({"event_type": "mouse_pressed", "button": 1, "mask": 768})
        );

        let wheel = NormalizedEvent::MouseWheel {
            axis: WheelAxis::Vertical,
            direction: -1,
        };
        assert_eq!(
            serde_json::to_value(wheel).unwrap(),
            json!({"event_type": "mouse_wheel", "direction": 3, "rotation": -1})
        );
    }

    #[test]
    fn test_event_type_matches_wire_tag() {
        let events = [
            NormalizedEvent::KeyTyped {
                code: KeyCode::new(1),
            },
            NormalizedEvent::MouseButtonReleased {
                button: 0,
                mask: ButtonMask::EMPTY,
            },
            NormalizedEvent::MouseWheel {
                axis: WheelAxis::Horizontal,
                direction: 1,
            },
        ];
        for event in events {
            let value = serde_json::to_value(event).unwrap();
            assert_eq!(value["event_type"], event.event_type());
        }
    }

    #[test]
    fn test_decode_wire_form() {
        let event: NormalizedEvent =
            serde_json::from_str(r#"{"event_type":"mouse_wheel","direction":4,"rotation":1}"#)
                .unwrap();
        assert_eq!(
            event,
            NormalizedEvent::MouseWheel {
                axis: WheelAxis::Horizontal,
                direction: 1
            }
        );

        let bad = serde_json::from_str::<NormalizedEvent>(
            r#"{"event_type":"mouse_wheel","direction":9,"rotation":1}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_button_mask_operations() {
        let left = ButtonMask::from_bits(1 << 8);
        let right = ButtonMask::from_bits(1 << 9);

        let mut mask = ButtonMask::EMPTY;
        mask.insert(left);
        mask.insert(right);
        assert_eq!(mask, left | right);
        assert!(mask.contains(left));

        mask.remove(left);
        assert_eq!(mask, right);
        mask.remove(left);
        assert_eq!(mask, right);

        mask.remove(right);
        assert!(mask.is_empty());
    }

    #[test]
    fn test_key_code_display() {
        assert_eq!(KeyCode::new(0x1e).to_string(), "0x001e");
    }
}
