use std::time::Duration;

use evdev::KeyCode;

use super::{ButtonSlot, ChordDef, DeviceMatch, Model, ModelProfile};

/// Ayn Loki MiniPro. The right side buttons are keyboard keys that send
/// regular shortcut macros.
pub static PROFILE: ModelProfile = ModelProfile {
    model: Model::AynGen3,
    button_delay: Duration::from_millis(110),
    capture_controller: true,
    capture_keyboard: true,
    capture_power: true,
    gamepad: DeviceMatch {
        name: "Microsoft X-Box 360 pad",
        phys: "usb-0000:04:00.4-2/input0",
    },
    keyboard: DeviceMatch {
        name: "AT Translated Set 2 keyboard",
        phys: "isa0060/serio0/input0",
    },
    keyboard_2: None,
    chords: &[
        // Front lower-left button
        ChordDef {
            slot: ButtonSlot::Button1,
            patterns: &[&[KeyCode::KEY_DELETE.0]],
            release_codes: &[KeyCode::KEY_DELETE.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Front lower-right button
        ChordDef {
            slot: ButtonSlot::Button2,
            patterns: &[&[
                KeyCode::KEY_T.0,
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTSHIFT.0,
                KeyCode::KEY_LEFTALT.0,
            ]],
            release_codes: &[
                KeyCode::KEY_T.0,
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTSHIFT.0,
                KeyCode::KEY_LEFTALT.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
    ],
    phantom_meta_rule: false,
    init_sysfs: None,
};
