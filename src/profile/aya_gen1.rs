use std::time::Duration;

use evdev::KeyCode;

use super::{ButtonSlot, ChordDef, DeviceMatch, Model, ModelProfile};

/// AYA NEO founder edition and 2021 models
pub static PROFILE: ModelProfile = ModelProfile {
    model: Model::AyaGen1,
    button_delay: Duration::from_millis(110),
    capture_controller: true,
    capture_keyboard: true,
    capture_power: true,
    gamepad: DeviceMatch {
        name: "Microsoft X-Box 360 pad",
        phys: "usb-0000:03:00.3-4/input0",
    },
    keyboard: DeviceMatch {
        name: "AT Translated Set 2 keyboard",
        phys: "isa0060/serio0/input0",
    },
    keyboard_2: None,
    chords: &[
        // WIN button. The power button mirrors this key, so it sits out
        // while a phantom press is pending.
        ChordDef {
            slot: ButtonSlot::Button1,
            patterns: &[&[KeyCode::KEY_LEFTMETA.0]],
            release_codes: &[KeyCode::KEY_LEFTMETA.0],
            rumble_on_complete: false,
            blocked_during_phantom: true,
        },
        // TM button
        ChordDef {
            slot: ButtonSlot::Button2,
            patterns: &[&[
                KeyCode::KEY_RIGHTCTRL.0,
                KeyCode::KEY_RIGHTALT.0,
                KeyCode::KEY_DELETE.0,
            ]],
            release_codes: &[
                KeyCode::KEY_RIGHTCTRL.0,
                KeyCode::KEY_RIGHTALT.0,
                KeyCode::KEY_DELETE.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // ESC button
        ChordDef {
            slot: ButtonSlot::Button3,
            patterns: &[&[KeyCode::KEY_ESC.0]],
            release_codes: &[KeyCode::KEY_ESC.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // KB button
        ChordDef {
            slot: ButtonSlot::Button4,
            patterns: &[&[
                KeyCode::KEY_O.0,
                KeyCode::KEY_RIGHTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
            ]],
            release_codes: &[
                KeyCode::KEY_O.0,
                KeyCode::KEY_RIGHTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
    ],
    phantom_meta_rule: true,
    init_sysfs: None,
};
