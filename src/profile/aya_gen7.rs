use std::time::Duration;

use evdev::KeyCode;

use super::{ButtonSlot, ChordDef, DeviceMatch, Model, ModelProfile};

/// AYA NEO AIR Plus with the Intel SoC
pub static PROFILE: ModelProfile = ModelProfile {
    model: Model::AyaGen7,
    button_delay: Duration::from_millis(110),
    capture_controller: true,
    capture_keyboard: true,
    capture_power: true,
    gamepad: DeviceMatch {
        name: "Microsoft X-Box 360 pad",
        phys: "usb-0000:00:14.0-6/input0",
    },
    keyboard: DeviceMatch {
        name: "AT Translated Set 2 keyboard",
        phys: "isa0060/serio0/input0",
    },
    keyboard_2: None,
    chords: &[
        // LC button
        ChordDef {
            slot: ButtonSlot::Button1,
            patterns: &[&[
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_F15.0,
            ]],
            release_codes: &[
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_F15.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Small button
        ChordDef {
            slot: ButtonSlot::Button2,
            patterns: &[&[KeyCode::KEY_D.0, KeyCode::KEY_LEFTMETA.0]],
            release_codes: &[KeyCode::KEY_D.0, KeyCode::KEY_LEFTMETA.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // RC button
        ChordDef {
            slot: ButtonSlot::Button4,
            patterns: &[&[
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_F16.0,
            ]],
            release_codes: &[
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_F16.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Big button
        ChordDef {
            slot: ButtonSlot::Button5,
            patterns: &[&[
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_F17.0,
            ]],
            release_codes: &[
                KeyCode::KEY_LEFTCTRL.0,
                KeyCode::KEY_LEFTMETA.0,
                KeyCode::KEY_F17.0,
            ],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
    ],
    phantom_meta_rule: true,
    init_sysfs: None,
};
