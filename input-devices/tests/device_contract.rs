//! Exercises the `InputDevice` contract through trait objects, the way the
//! capture session consumes devices.

use std::time::Duration;

use input_devices::{DeviceError, InputDevice, VirtualDevice};
use input_protocol::{native, KeyState, RawEvent};
use tokio::time::timeout;

#[tokio::test]
async fn test_boxed_devices_stream_independently() {
    let (keyboard, keyboard_handle) = VirtualDevice::new("keyboard", 4);
    let (mouse, mouse_handle) = VirtualDevice::new("mouse", 4);
    let mut devices: Vec<Box<dyn InputDevice>> = vec![Box::new(keyboard), Box::new(mouse)];

    mouse_handle
        .send(RawEvent::relative(native::REL_X, 5))
        .await
        .unwrap();

    // The keyboard has nothing queued, so its read stays pending
    let blocked = timeout(Duration::from_millis(50), devices[0].next_event()).await;
    assert!(blocked.is_err(), "keyboard read should still be pending");

    let moved = timeout(Duration::from_secs(1), devices[1].next_event())
        .await
        .expect("Timeout waiting for mouse event")
        .unwrap();
    assert_eq!(moved, RawEvent::relative(native::REL_X, 5));

    keyboard_handle
        .send(RawEvent::key(native::KEY_A, KeyState::Pressed))
        .await
        .unwrap();
    let pressed = timeout(Duration::from_secs(1), devices[0].next_event())
        .await
        .expect("Timeout waiting for keyboard event")
        .unwrap();
    assert_eq!(pressed.code, native::KEY_A);
}

#[tokio::test]
async fn test_close_abandons_pending_events() {
    let (device, mut handle) = VirtualDevice::new("mouse", 4);
    let mut device: Box<dyn InputDevice> = Box::new(device);

    handle
        .send_all([
            RawEvent::relative(native::REL_X, 1),
            RawEvent::relative(native::REL_X, 2),
        ])
        .await
        .unwrap();

    device.close();
    handle.wait_closed().await;

    assert!(matches!(device.next_event().await, Err(DeviceError::Closed)));
}
