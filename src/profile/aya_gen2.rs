use std::time::Duration;

use evdev::KeyCode;

use super::{ButtonSlot, ChordDef, DeviceMatch, Model, ModelProfile};

/// AYA NEO NEXT models. Both vendor buttons report different scancode
/// sets depending on firmware revision, so each chord carries two
/// patterns.
pub static PROFILE: ModelProfile = ModelProfile {
    model: Model::AyaGen2,
    button_delay: Duration::from_millis(100),
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
        // Small button
        ChordDef {
            slot: ButtonSlot::Button2,
            patterns: &[
                &[KeyCode::KEY_APOSTROPHE.0, KeyCode::KEY_COPY.0],
                &[KeyCode::KEY_D.0, KeyCode::KEY_LEFTMETA.0],
            ],
            release_codes: &[
                KeyCode::KEY_D.0,
                KeyCode::KEY_APOSTROPHE.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_COPY.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Big button
        ChordDef {
            slot: ButtonSlot::Button5,
            patterns: &[
                &[KeyCode::KEY_KPENTER.0, KeyCode::KEY_LEFT.0, KeyCode::KEY_COPY.0],
                &[
                    KeyCode::KEY_F12.0,
                    KeyCode::KEY_RIGHTCTRL.0,
                    KeyCode::KEY_LEFTMETA.0,
                ],
            ],
            release_codes: &[
                KeyCode::KEY_F12.0,
                KeyCode::KEY_KPENTER.0,
                KeyCode::KEY_RIGHTCTRL.0,
                KeyCode::KEY_LEFT.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_COPY.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
    ],
    phantom_meta_rule: true,
    init_sysfs: None,
};
