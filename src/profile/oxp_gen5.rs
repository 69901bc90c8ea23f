use std::time::Duration;

use evdev::KeyCode;

use super::{ButtonSlot, ChordDef, DeviceMatch, Model, ModelProfile};

/// ONEXPLAYER 2 models. The BIOS reports no useful physical address for
/// the pad, so it is matched by name alone. Writing the tt_toggle switch
/// hands the turbo button to the kernel platform driver.
pub static PROFILE: ModelProfile = ModelProfile {
    model: Model::OxpGen5,
    button_delay: Duration::from_millis(90),
    capture_controller: true,
    capture_keyboard: true,
    capture_power: true,
    gamepad: DeviceMatch {
        name: "Microsoft X-Box 360 pad",
        phys: "",
    },
    keyboard: DeviceMatch {
        name: "AT Translated Set 2 keyboard",
        phys: "isa0060/serio0/input0",
    },
    keyboard_2: None,
    chords: &[
        // Short press orange + turbo
        ChordDef {
            slot: ButtonSlot::Button1,
            patterns: &[&[KeyCode::KEY_SYSRQ.0, KeyCode::KEY_LEFTMETA.0]],
            release_codes: &[KeyCode::KEY_SYSRQ.0, KeyCode::KEY_LEFTMETA.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Turbo button
        ChordDef {
            slot: ButtonSlot::Button2,
            patterns: &[&[KeyCode::KEY_2.0, KeyCode::KEY_RIGHTCTRL.0]],
            release_codes: &[KeyCode::KEY_2.0, KeyCode::KEY_RIGHTCTRL.0],
            rumble_on_complete: true,
            blocked_during_phantom: false,
        },
        // Short press orange + KB
        ChordDef {
            slot: ButtonSlot::Button3,
            patterns: &[&[
                KeyCode::KEY_RIGHTCTRL.0,
                KeyCode::KEY_RIGHTALT.0,
                KeyCode::KEY_DELETE.0,
            ]],
            release_codes: &[KeyCode::KEY_RIGHTALT.0, KeyCode::KEY_DELETE.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Short press KB
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
        // Short press orange
        ChordDef {
            slot: ButtonSlot::Button5,
            patterns: &[&[KeyCode::KEY_D.0, KeyCode::KEY_LEFTMETA.0]],
            release_codes: &[KeyCode::KEY_D.0, KeyCode::KEY_LEFTMETA.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
        // Long press orange
        ChordDef {
            slot: ButtonSlot::Button6,
            patterns: &[&[KeyCode::KEY_G.0, KeyCode::KEY_LEFTMETA.0]],
            release_codes: &[KeyCode::KEY_G.0, KeyCode::KEY_LEFTMETA.0],
            rumble_on_complete: false,
            blocked_during_phantom: false,
        },
    ],
    phantom_meta_rule: true,
    init_sysfs: Some("/sys/devices/platform/oxp-platform/tt_toggle"),
};
