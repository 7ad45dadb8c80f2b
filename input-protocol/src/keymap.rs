//! Native-to-protocol code translation.
//!
//! Two disjoint static tables: one for keyboard keys (native `KEY_*` to
//! libuiohook `VC_*` virtual codes) and one for mouse buttons (native `BTN_*` to
//! a zero-based button number and its mask bit). Lookups are pure and total;
//! a native code missing from a table yields `None`, and callers drop the event.
//! Many native codes are unmapped on purpose (multimedia keys, F13 and up).

use crate::event::{ButtonMask, KeyCode};
use crate::native::*;

/// A protocol-space mouse button: its number and the mask bit it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton {
    /// Zero-based button number (`BTN_LEFT` is 0)
    pub id: u8,
    /// The single bit this button sets in a [`ButtonMask`]
    pub mask: ButtonMask,
}

impl MouseButton {
    const fn new(id: u8) -> Self {
        Self {
            id,
            mask: ButtonMask::from_bits(1 << (ButtonMask::FIRST_BUTTON_BIT + id as u16)),
        }
    }
}

/// Keyboard table, sorted by native code.
pub const KEY_TABLE: &[(u16, KeyCode)] = &[
    (KEY_ESC, KeyCode::new(0x0001)),
    (KEY_1, KeyCode::new(0x0002)),
    (KEY_2, KeyCode::new(0x0003)),
    (KEY_3, KeyCode::new(0x0004)),
    (KEY_4, KeyCode::new(0x0005)),
    (KEY_5, KeyCode::new(0x0006)),
    (KEY_6, KeyCode::new(0x0007)),
    (KEY_7, KeyCode::new(0x0008)),
    (KEY_8, KeyCode::new(0x0009)),
    (KEY_9, KeyCode::new(0x000a)),
    (KEY_0, KeyCode::new(0x000b)),
    (KEY_MINUS, KeyCode::new(0x000c)),
    (KEY_EQUAL, KeyCode::new(0x000d)),
    (KEY_BACKSPACE, KeyCode::new(0x000e)),
    (KEY_TAB, KeyCode::new(0x000f)),
    (KEY_Q, KeyCode::new(0x0010)),
    (KEY_W, KeyCode::new(0x0011)),
    (KEY_E, KeyCode::new(0x0012)),
    (KEY_R, KeyCode::new(0x0013)),
    (KEY_T, KeyCode::new(0x0014)),
    (KEY_Y, KeyCode::new(0x0015)),
    (KEY_U, KeyCode::new(0x0016)),
    (KEY_I, KeyCode::new(0x0017)),
    (KEY_O, KeyCode::new(0x0018)),
    (KEY_P, KeyCode::new(0x0019)),
    (KEY_LEFTBRACE, KeyCode::new(0x001a)),
    (KEY_RIGHTBRACE, KeyCode::new(0x001b)),
    (KEY_ENTER, KeyCode::new(0x001c)),
    (KEY_LEFTCTRL, KeyCode::new(0x001d)),
    (KEY_A, KeyCode::new(0x001e)),
    (KEY_S, KeyCode::new(0x001f)),
    (KEY_D, KeyCode::new(0x0020)),
    (KEY_F, KeyCode::new(0x0021)),
    (KEY_G, KeyCode::new(0x0022)),
    (KEY_H, KeyCode::new(0x0023)),
    (KEY_J, KeyCode::new(0x0024)),
    (KEY_K, KeyCode::new(0x0025)),
    (KEY_L, KeyCode::new(0x0026)),
    (KEY_SEMICOLON, KeyCode::new(0x0027)),
    (KEY_APOSTROPHE, KeyCode::new(0x0028)),
    (KEY_GRAVE, KeyCode::new(0x0029)),
    (KEY_LEFTSHIFT, KeyCode::new(0x002a)),
    (KEY_BACKSLASH, KeyCode::new(0x002b)),
    (KEY_Z, KeyCode::new(0x002c)),
    (KEY_X, KeyCode::new(0x002d)),
    (KEY_C, KeyCode::new(0x002e)),
    (KEY_V, KeyCode::new(0x002f)),
    (KEY_B, KeyCode::new(0x0030)),
    (KEY_N, KeyCode::new(0x0031)),
    (KEY_M, KeyCode::new(0x0032)),
    (KEY_COMMA, KeyCode::new(0x0033)),
    (KEY_DOT, KeyCode::new(0x0034)),
    (KEY_SLASH, KeyCode::new(0x0035)),
    (KEY_RIGHTSHIFT, KeyCode::new(0x0036)),
    (KEY_KPASTERISK, KeyCode::new(0x0037)),
    (KEY_LEFTALT, KeyCode::new(0x0038)),
    (KEY_SPACE, KeyCode::new(0x0039)),
    (KEY_CAPSLOCK, KeyCode::new(0x003a)),
    (KEY_F1, KeyCode::new(0x003b)),
    (KEY_F2, KeyCode::new(0x003c)),
    (KEY_F3, KeyCode::new(0x003d)),
    (KEY_F4, KeyCode::new(0x003e)),
    (KEY_F5, KeyCode::new(0x003f)),
    (KEY_F6, KeyCode::new(0x0040)),
    (KEY_F7, KeyCode::new(0x0041)),
    (KEY_F8, KeyCode::new(0x0042)),
    (KEY_F9, KeyCode::new(0x0043)),
    (KEY_F10, KeyCode::new(0x0044)),
    (KEY_NUMLOCK, KeyCode::new(0x0045)),
    (KEY_SCROLLLOCK, KeyCode::new(0x0046)),
    (KEY_KP7, KeyCode::new(0x0047)),
    (KEY_KP8, KeyCode::new(0x0048)),
    (KEY_KP9, KeyCode::new(0x0049)),
    (KEY_KPMINUS, KeyCode::new(0x004a)),
    (KEY_KP4, KeyCode::new(0x004b)),
    (KEY_KP5, KeyCode::new(0x004c)),
    (KEY_KP6, KeyCode::new(0x004d)),
    (KEY_KPPLUS, KeyCode::new(0x004e)),
    (KEY_KP1, KeyCode::new(0x004f)),
    (KEY_KP2, KeyCode::new(0x0050)),
    (KEY_KP3, KeyCode::new(0x0051)),
    (KEY_KP0, KeyCode::new(0x0052)),
    (KEY_KPDOT, KeyCode::new(0x0053)),
    (KEY_F11, KeyCode::new(0x0057)),
    (KEY_F12, KeyCode::new(0x0058)),
    (KEY_KPENTER, KeyCode::new(0x0e1c)),
    (KEY_RIGHTCTRL, KeyCode::new(0x0e1d)),
    (KEY_KPSLASH, KeyCode::new(0x0e35)),
    (KEY_RIGHTALT, KeyCode::new(0x0e38)),
    (KEY_HOME, KeyCode::new(0x0e47)),
    (KEY_UP, KeyCode::new(0x0e48)),
    (KEY_PAGEUP, KeyCode::new(0x0e49)),
    (KEY_LEFT, KeyCode::new(0x0e4b)),
    (KEY_RIGHT, KeyCode::new(0x0e4d)),
    (KEY_END, KeyCode::new(0x0e4f)),
    (KEY_DOWN, KeyCode::new(0x0e50)),
    (KEY_PAGEDOWN, KeyCode::new(0x0e51)),
    (KEY_INSERT, KeyCode::new(0x0e52)),
    (KEY_DELETE, KeyCode::new(0x0e53)),
    (KEY_PAUSE, KeyCode::new(0x0e45)),
    (KEY_LEFTMETA, KeyCode::new(0x0e5b)),
    (KEY_RIGHTMETA, KeyCode::new(0x0e5c)),
    (KEY_COMPOSE, KeyCode::new(0x0e5d)),
    // Only KEY_PRINT maps to PrintScreen; each protocol code has one native source
    (KEY_PRINT, KeyCode::new(0x0e37)),
];

/// Mouse-button table, sorted by native code.
pub const BUTTON_TABLE: &[(u16, MouseButton)] = &[
    (BTN_LEFT, MouseButton::new(0)),
    (BTN_RIGHT, MouseButton::new(1)),
    (BTN_MIDDLE, MouseButton::new(2)),
    (BTN_SIDE, MouseButton::new(3)),
    (BTN_EXTRA, MouseButton::new(4)),
];

/// Translate a native keyboard code into its protocol key code.
pub fn translate_key(native: u16) -> Option<KeyCode> {
    lookup(KEY_TABLE, native)
}

/// Translate a native mouse-button code into its protocol button.
pub fn translate_button(native: u16) -> Option<MouseButton> {
    lookup(BUTTON_TABLE, native)
}

fn lookup<T: Copy>(table: &[(u16, T)], native: u16) -> Option<T> {
    table
        .binary_search_by_key(&native, |(code, _)| *code)
        .ok()
        .map(|index| table[index].1)
}
