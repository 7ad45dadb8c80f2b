//! Property-based tests for the input state tracker
//!
//! Replays arbitrary raw event sequences and checks the tracked state against
//! a simple model of "last press or release wins".

use std::collections::{BTreeSet, HashMap};

use input_protocol::{keymap, native, ButtonMask, KeyState, NormalizedEvent, RawEvent};
use input_stream::InputStateTracker;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Any native code the tracker maps: keyboard keys and mouse buttons
fn mapped_code_strategy() -> impl Strategy<Value = u16> {
    let codes: Vec<u16> = keymap::KEY_TABLE
        .iter()
        .map(|(native, _)| *native)
        .chain(keymap::BUTTON_TABLE.iter().map(|(native, _)| *native))
        .collect();
    prop::sample::select(codes)
}

fn key_state_strategy() -> impl Strategy<Value = KeyState> {
    prop_oneof![
        Just(KeyState::Pressed),
        Just(KeyState::Released),
        Just(KeyState::Repeat),
    ]
}

fn key_event_strategy() -> impl Strategy<Value = RawEvent> {
    (mapped_code_strategy(), key_state_strategy()).prop_map(|(code, state)| RawEvent::key(code, state))
}

fn motion_strategy() -> impl Strategy<Value = RawEvent> {
    (
        prop_oneof![Just(native::REL_X), Just(native::REL_Y)],
        -500i32..=500,
    )
        .prop_map(|(axis, delta)| RawEvent::relative(axis, delta))
}

/// Arbitrary triples, mostly unrecognised
fn noise_strategy() -> impl Strategy<Value = RawEvent> {
    (any::<u16>(), any::<u16>(), any::<i32>()).prop_map(|(t, c, v)| RawEvent::new(t, c, v))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Held keys and buttons are exactly those whose last press/release was a press.
    #[test]
    fn prop_last_press_or_release_wins(
        events in prop::collection::vec(key_event_strategy(), 0..200),
        forward_repeat in any::<bool>(),
    ) {
        let mut tracker = InputStateTracker::new().with_key_repeat(forward_repeat);
        let mut last: HashMap<u16, bool> = HashMap::new();

        for event in &events {
            tracker.apply(event);
            match KeyState::from_value(event.value) {
                KeyState::Pressed => { last.insert(event.code, true); }
                KeyState::Released => { last.insert(event.code, false); }
                _ => {}
            }
        }

        let held: Vec<u16> = last.iter().filter(|(_, down)| **down).map(|(code, _)| *code).collect();

        let expected_keys: BTreeSet<_> = held.iter().filter_map(|code| keymap::translate_key(*code)).collect();
        let expected_mask = held
            .iter()
            .filter_map(|code| keymap::translate_button(*code))
            .fold(ButtonMask::EMPTY, |mask, button| mask | button.mask);

        prop_assert_eq!(&tracker.state().pressed_keys, &expected_keys);
        prop_assert_eq!(tracker.state().button_mask, expected_mask);
    }

    /// Repeats never change state, whether or not they are forwarded.
    #[test]
    fn prop_repeat_never_mutates_state(
        setup in prop::collection::vec(key_event_strategy(), 0..50),
        code in mapped_code_strategy(),
        forward_repeat in any::<bool>(),
    ) {
        let mut tracker = InputStateTracker::new().with_key_repeat(forward_repeat);
        for event in &setup {
            tracker.apply(event);
        }

        let before = tracker.state().clone();
        let emitted = tracker.apply(&RawEvent::key(code, KeyState::Repeat));
        prop_assert_eq!(tracker.state(), &before);

        match emitted {
            Some(NormalizedEvent::KeyTyped { code: typed }) => {
                prop_assert!(forward_repeat);
                prop_assert_eq!(Some(typed), keymap::translate_key(code));
            }
            None => prop_assert!(!forward_repeat || keymap::translate_key(code).is_none()),
            Some(other) => prop_assert!(false, "unexpected event {:?}", other),
        }
    }

    /// Reported positions are the running sums of all deltas per axis.
    #[test]
    fn prop_motion_is_cumulative(
        events in prop::collection::vec(motion_strategy(), 1..200),
    ) {
        let mut tracker = InputStateTracker::new();
        let (mut x, mut y) = (0i64, 0i64);

        for event in &events {
            if event.code == native::REL_X {
                x += i64::from(event.value);
            } else {
                y += i64::from(event.value);
            }
            prop_assert_eq!(tracker.apply(event), Some(NormalizedEvent::MouseMoved { x, y }));
        }
        prop_assert_eq!(tracker.state().position(), (x, y));
    }

    /// Button events always carry the mask the tracker holds afterwards.
    #[test]
    fn prop_button_events_report_post_event_mask(
        events in prop::collection::vec(key_event_strategy(), 0..200),
    ) {
        let mut tracker = InputStateTracker::new();

        for event in &events {
            match tracker.apply(event) {
                Some(NormalizedEvent::MouseButtonPressed { mask, .. })
                | Some(NormalizedEvent::MouseButtonReleased { mask, .. }) => {
                    prop_assert_eq!(mask, tracker.state().button_mask);
                }
                _ => {}
            }
        }
    }

    /// Arbitrary triples never panic, whatever the type, code or value.
    #[test]
    fn prop_arbitrary_input_is_total(
        events in prop::collection::vec(noise_strategy(), 0..200),
    ) {
        let mut tracker = InputStateTracker::new().with_key_repeat(true);
        for event in &events {
            let _ = tracker.apply(event);
        }
    }
}
