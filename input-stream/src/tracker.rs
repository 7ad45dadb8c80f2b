//! Input state tracking: raw events in, normalized events out.
//!
//! [`InputStateTracker`] owns the per-session [`SessionState`] and is the only
//! thing that mutates it. Every raw event goes through [`InputStateTracker::apply`],
//! which updates the state and yields at most one [`NormalizedEvent`]. Unmapped
//! codes and unrecognised event types yield nothing; nothing here fails.

use std::collections::BTreeSet;

use input_protocol::{
    keymap, native, ButtonMask, EventKind, KeyCode, KeyState, NormalizedEvent, RawEvent,
    WheelAxis,
};

/// Input state accumulated over one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Sum of every relative X delta since the session started. Not clamped.
    pub mouse_x: i64,
    /// Sum of every relative Y delta since the session started. Not clamped.
    pub mouse_y: i64,
    /// Mouse buttons currently held
    pub button_mask: ButtonMask,
    /// Keyboard keys currently held, in protocol codes
    pub pressed_keys: BTreeSet<KeyCode>,
}

impl SessionState {
    pub fn position(&self) -> (i64, i64) {
        (self.mouse_x, self.mouse_y)
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed_keys.contains(&code)
    }
}

/// Translates raw device events and tracks the resulting input state.
#[derive(Debug, Default)]
pub struct InputStateTracker {
    state: SessionState,
    forward_key_repeat: bool,
}

impl InputStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `KeyTyped` for key auto-repeat instead of dropping it.
    pub fn with_key_repeat(mut self, enabled: bool) -> Self {
        self.forward_key_repeat = enabled;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Apply one raw event, returning the normalized event it produces, if any.
    pub fn apply(&mut self, event: &RawEvent) -> Option<NormalizedEvent> {
        match event.kind() {
            EventKind::Key => self.apply_key(event.code, KeyState::from_value(event.value)),
            EventKind::Relative => self.apply_relative(event.code, event.value),
            EventKind::Sync | EventKind::Other(_) => None,
        }
    }

    fn apply_key(&mut self, native_code: u16, key_state: KeyState) -> Option<NormalizedEvent> {
        if let Some(code) = keymap::translate_key(native_code) {
            return match key_state {
                KeyState::Pressed => {
                    self.state.pressed_keys.insert(code);
                    Some(NormalizedEvent::KeyPressed { code })
                }
                KeyState::Released => {
                    self.state.pressed_keys.remove(&code);
                    Some(NormalizedEvent::KeyReleased { code })
                }
                KeyState::Repeat if self.forward_key_repeat => {
                    Some(NormalizedEvent::KeyTyped { code })
                }
                KeyState::Repeat | KeyState::Unknown(_) => None,
            };
        }

        let button = keymap::translate_button(native_code)?;
        match key_state {
            KeyState::Pressed => {
                self.state.button_mask.insert(button.mask);
                Some(NormalizedEvent::MouseButtonPressed {
                    button: button.id,
                    mask: self.state.button_mask,
                })
            }
            KeyState::Released => {
                self.state.button_mask.remove(button.mask);
                Some(NormalizedEvent::MouseButtonReleased {
                    button: button.id,
                    mask: self.state.button_mask,
                })
            }
            // Buttons have no typed form
            KeyState::Repeat | KeyState::Unknown(_) => None,
        }
    }

    fn apply_relative(&mut self, axis: u16, delta: i32) -> Option<NormalizedEvent> {
        match axis {
            native::REL_X => {
                self.state.mouse_x = self.state.mouse_x.saturating_add(i64::from(delta));
                Some(self.moved())
            }
            native::REL_Y => {
                self.state.mouse_y = self.state.mouse_y.saturating_add(i64::from(delta));
                Some(self.moved())
            }
            native::REL_WHEEL => Some(wheel(WheelAxis::Vertical, delta)),
            native::REL_HWHEEL => Some(wheel(WheelAxis::Horizontal, delta)),
            _ => None,
        }
    }

    fn moved(&self) -> NormalizedEvent {
        NormalizedEvent::MouseMoved {
            x: self.state.mouse_x,
            y: self.state.mouse_y,
        }
    }
}

fn wheel(axis: WheelAxis, delta: i32) -> NormalizedEvent {
    // Magnitude is dropped; a zero delta counts as negative
    let direction = if delta > 0 { 1 } else { -1 };
    NormalizedEvent::MouseWheel { axis, direction }
}
