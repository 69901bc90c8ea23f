//! Per-model capture policy. Each supported handheld family carries a
//! static profile describing which input devices to capture, how the
//! vendor buttons chord on the internal keyboard, and how quickly
//! synthesized events may be paced out.

pub mod aya_gen1;
pub mod aya_gen2;
pub mod aya_gen7;
pub mod ayn_gen3;
pub mod oxp_gen5;

#[cfg(test)]
pub mod profile_test;

use std::time::Duration;

use evdev::{Device, KeyCode};
use thiserror::Error;

use crate::config::{ButtonMap, ButtonMapConfig};
use crate::dmi::data::DMIData;

/// Represents all possible errors identifying the host hardware
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("{product_name} is not currently supported by this tool")]
    UnsupportedModel { product_name: String },
}

/// Supported handheld model families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    AyaGen1,
    AyaGen2,
    AyaGen7,
    AynGen3,
    OxpGen5,
}

impl Model {
    /// Identify the host model from DMI data and the CPU vendor string.
    /// Some product names are shared across hardware revisions, so the
    /// CPU vendor is needed to tell them apart.
    pub fn identify(dmi: &DMIData, cpu_vendor: &str) -> Result<Model, IdentifyError> {
        let model = match dmi.product_name.as_str() {
            "AYA NEO FOUNDER" | "AYA NEO 2021" | "AYANEO 2021" | "AYANEO 2021 Pro"
            | "AYANEO 2021 Pro Retro Power" => Model::AyaGen1,
            "NEXT" | "NEXT Pro" | "NEXT Advance" | "AYANEO NEXT" | "AYANEO NEXT Pro"
            | "AYANEO NEXT Advance" => Model::AyaGen2,
            "AIR Plus" if cpu_vendor == "GenuineIntel" => Model::AyaGen7,
            "Loki MiniPro" => Model::AynGen3,
            "ONEXPLAYER 2" | "ONEXPLAYER 2 Pro" => Model::OxpGen5,
            _ => {
                return Err(IdentifyError::UnsupportedModel {
                    product_name: dmi.product_name.clone(),
                })
            }
        };
        Ok(model)
    }

    /// Returns the static capture policy for this model
    pub fn profile(&self) -> &'static ModelProfile {
        match self {
            Model::AyaGen1 => &aya_gen1::PROFILE,
            Model::AyaGen2 => &aya_gen2::PROFILE,
            Model::AyaGen7 => &aya_gen7::PROFILE,
            Model::AynGen3 => &ayn_gen3::PROFILE,
            Model::OxpGen5 => &oxp_gen5::PROFILE,
        }
    }
}

/// How to find a physical input device for capture
#[derive(Debug, Clone, Copy)]
pub struct DeviceMatch {
    pub name: &'static str,
    /// Physical address the device must report. Empty matches any address.
    pub phys: &'static str,
}

impl DeviceMatch {
    /// Returns true if the given evdev device reports this name and
    /// physical address.
    pub fn matches(&self, device: &Device) -> bool {
        if device.name().unwrap_or_default() != self.name {
            return false;
        }
        self.phys.is_empty() || device.physical_path().unwrap_or_default() == self.phys
    }
}

/// Config button slots a chord rule can draw its action from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSlot {
    Button1,
    Button2,
    Button3,
    Button4,
    Button5,
    Button6,
    Button7,
    Button8,
    Button9,
    Button10,
    Button11,
    Button12,
}

impl ButtonSlot {
    /// Returns the action name configured for this slot
    pub fn action_name<'a>(&self, map: &'a ButtonMap) -> &'a str {
        match self {
            ButtonSlot::Button1 => map.button_1.as_str(),
            ButtonSlot::Button2 => map.button_2.as_str(),
            ButtonSlot::Button3 => map.button_3.as_str(),
            ButtonSlot::Button4 => map.button_4.as_str(),
            ButtonSlot::Button5 => map.button_5.as_str(),
            ButtonSlot::Button6 => map.button_6.as_str(),
            ButtonSlot::Button7 => map.button_7.as_str(),
            ButtonSlot::Button8 => map.button_8.as_str(),
            ButtonSlot::Button9 => map.button_9.as_str(),
            ButtonSlot::Button10 => map.button_10.as_str(),
            ButtonSlot::Button11 => map.button_11.as_str(),
            ButtonSlot::Button12 => map.button_12.as_str(),
        }
    }
}

/// One chord definition in a model's static table
pub struct ChordDef {
    pub slot: ButtonSlot,
    /// Active key patterns that can start the chord, each in ascending
    /// code order. A chord may have more than one physical encoding.
    pub patterns: &'static [&'static [u16]],
    /// Codes whose release can complete the chord
    pub release_codes: &'static [u16],
    /// Buzz the controller when the chord completes
    pub rumble_on_complete: bool,
    /// Suppress the chord while a power button phantom key is pending
    pub blocked_during_phantom: bool,
}

/// Static per-model capture policy
pub struct ModelProfile {
    pub model: Model,
    /// Pacing between the events of a synthesized multi-key burst
    pub button_delay: Duration,
    pub capture_controller: bool,
    pub capture_keyboard: bool,
    pub capture_power: bool,
    pub gamepad: DeviceMatch,
    pub keyboard: DeviceMatch,
    pub keyboard_2: Option<DeviceMatch>,
    pub chords: &'static [ChordDef],
    /// The firmware mirrors a power button press as a stray meta key on
    /// the internal keyboard. Models with this quirk carry a rule that
    /// swallows the stray release.
    pub phantom_meta_rule: bool,
    /// Sysfs path written with "1" at startup when present
    pub init_sysfs: Option<&'static str>,
}

/// What a chord does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalAction {
    Screenshot,
    QuickMenu,
    Escape,
    Guide,
    AltTab,
    KillWindow,
    OnScreenKeyboard,
    OpenChimera,
    TogglePerformance,
    ToggleMouse,
    ToggleGyro,
    BrightnessUp,
    BrightnessDown,
}

/// One-shot handlers an action can dispatch to instead of key events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    OpenKeyboard,
    OpenChimera,
    TogglePerformance,
    ToggleMouse,
    ToggleGyro,
    BrightnessUp,
    BrightnessDown,
}

/// Payload emitted when an action fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvents {
    /// Key codes pressed in listed order and released in reverse
    Keys(&'static [u16]),
    /// A handler invoked on press only
    Effect(SideEffect),
}

static SCREENSHOT_KEYS: [u16; 2] = [KeyCode::BTN_MODE.0, KeyCode::BTN_TR.0];
static QUICK_MENU_KEYS: [u16; 2] = [KeyCode::BTN_MODE.0, KeyCode::BTN_SOUTH.0];
static ESCAPE_KEYS: [u16; 1] = [KeyCode::KEY_ESC.0];
static GUIDE_KEYS: [u16; 1] = [KeyCode::BTN_MODE.0];
static ALT_TAB_KEYS: [u16; 2] = [KeyCode::KEY_LEFTALT.0, KeyCode::KEY_TAB.0];
static KILL_KEYS: [u16; 2] = [KeyCode::KEY_LEFTMETA.0, KeyCode::KEY_K.0];

impl LogicalAction {
    /// Resolve a config action name
    pub fn from_name(name: &str) -> Option<LogicalAction> {
        let action = match name {
            "SCR" => LogicalAction::Screenshot,
            "QAM" => LogicalAction::QuickMenu,
            "ESC" => LogicalAction::Escape,
            "MODE" => LogicalAction::Guide,
            "ALT_TAB" => LogicalAction::AltTab,
            "KILL" => LogicalAction::KillWindow,
            "OSK" => LogicalAction::OnScreenKeyboard,
            "OPEN_CHIMERA" => LogicalAction::OpenChimera,
            "TOGGLE_PERFORMANCE" => LogicalAction::TogglePerformance,
            "TOGGLE_MOUSE" => LogicalAction::ToggleMouse,
            "TOGGLE_GYRO" => LogicalAction::ToggleGyro,
            "BRIGHTNESS_UP" => LogicalAction::BrightnessUp,
            "BRIGHTNESS_DOWN" => LogicalAction::BrightnessDown,
            _ => return None,
        };
        Some(action)
    }

    /// What gets emitted when this action fires
    pub fn events(&self) -> ActionEvents {
        match self {
            LogicalAction::Screenshot => ActionEvents::Keys(&SCREENSHOT_KEYS),
            LogicalAction::QuickMenu => ActionEvents::Keys(&QUICK_MENU_KEYS),
            LogicalAction::Escape => ActionEvents::Keys(&ESCAPE_KEYS),
            LogicalAction::Guide => ActionEvents::Keys(&GUIDE_KEYS),
            LogicalAction::AltTab => ActionEvents::Keys(&ALT_TAB_KEYS),
            LogicalAction::KillWindow => ActionEvents::Keys(&KILL_KEYS),
            LogicalAction::OnScreenKeyboard => ActionEvents::Effect(SideEffect::OpenKeyboard),
            LogicalAction::OpenChimera => ActionEvents::Effect(SideEffect::OpenChimera),
            LogicalAction::TogglePerformance => {
                ActionEvents::Effect(SideEffect::TogglePerformance)
            }
            LogicalAction::ToggleMouse => ActionEvents::Effect(SideEffect::ToggleMouse),
            LogicalAction::ToggleGyro => ActionEvents::Effect(SideEffect::ToggleGyro),
            LogicalAction::BrightnessUp => ActionEvents::Effect(SideEffect::BrightnessUp),
            LogicalAction::BrightnessDown => ActionEvents::Effect(SideEffect::BrightnessDown),
        }
    }

    /// Instant actions press on chord start and release on chord end,
    /// bypassing the single-slot queue, so the button can be held.
    pub fn is_instant(&self) -> bool {
        matches!(self, LogicalAction::Guide)
    }
}

/// Action taken when the power button is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerAction {
    #[default]
    Suspend,
    Hibernate,
    Shutdown,
}

impl PowerAction {
    /// Resolve a config power action name
    pub fn from_name(name: &str) -> Option<PowerAction> {
        let action = match name {
            "SUSPEND" => PowerAction::Suspend,
            "HIBERNATE" => PowerAction::Hibernate,
            "SHUTDOWN" => PowerAction::Shutdown,
            _ => return None,
        };
        Some(action)
    }
}

/// A chord rule bound to its configured action
#[derive(Debug, Clone)]
pub struct ChordRule {
    pub action: LogicalAction,
    pub patterns: &'static [&'static [u16]],
    pub release_codes: &'static [u16],
    pub rumble_on_complete: bool,
    pub blocked_during_phantom: bool,
}

/// A model's capture policy bound to the user's button map
#[derive(Debug, Clone)]
pub struct Profile {
    pub model: Model,
    pub button_delay: Duration,
    pub capture_controller: bool,
    pub capture_keyboard: bool,
    pub capture_power: bool,
    pub gamepad: DeviceMatch,
    pub keyboard: DeviceMatch,
    pub keyboard_2: Option<DeviceMatch>,
    /// Chord rules in evaluation order. The first matching rule wins.
    pub rules: Vec<ChordRule>,
    pub phantom_meta_rule: bool,
    pub init_sysfs: Option<&'static str>,
    pub power_action: PowerAction,
}

impl Profile {
    /// Bind the model's chord table to the actions named in the config.
    /// Slots naming an unknown action are dropped from the table with a
    /// warning rather than failing the whole profile.
    pub fn build(model: Model, config: &ButtonMapConfig) -> Profile {
        let profile = model.profile();
        let mut rules = Vec::with_capacity(profile.chords.len());
        for chord in profile.chords {
            let name = chord.slot.action_name(&config.button_map);
            if PowerAction::from_name(name).is_some() {
                log::error!(
                    "Power mode {name} set to button action. Check your configuration file."
                );
                continue;
            }
            let Some(action) = LogicalAction::from_name(name) else {
                log::warn!("{name} not defined.");
                continue;
            };
            rules.push(ChordRule {
                action,
                patterns: chord.patterns,
                release_codes: chord.release_codes,
                rumble_on_complete: chord.rumble_on_complete,
                blocked_during_phantom: chord.blocked_during_phantom,
            });
        }

        let power_action = config
            .button_map
            .power_button
            .as_deref()
            .and_then(|name| {
                let action = PowerAction::from_name(name);
                if action.is_none() {
                    log::warn!("Power action {name} not defined, defaulting to suspend.");
                }
                action
            })
            .unwrap_or_default();

        Profile {
            model,
            button_delay: profile.button_delay,
            capture_controller: profile.capture_controller,
            capture_keyboard: profile.capture_keyboard,
            capture_power: profile.capture_power,
            gamepad: profile.gamepad,
            keyboard: profile.keyboard,
            keyboard_2: profile.keyboard_2,
            rules,
            phantom_meta_rule: profile.phantom_meta_rule,
            init_sysfs: profile.init_sysfs,
            power_action,
        }
    }
}
