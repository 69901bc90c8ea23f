use evdev::KeyCode;

use crate::config::ButtonMapConfig;
use crate::dmi::data::DMIData;
use crate::profile::{ActionEvents, LogicalAction, Model, PowerAction, Profile, SideEffect};

fn dmi_with_product(name: &str) -> DMIData {
    DMIData {
        product_name: name.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_identify_supported_models() {
    let cases = [
        ("AYA NEO FOUNDER", "AuthenticAMD", Model::AyaGen1),
        ("AYANEO 2021 Pro", "AuthenticAMD", Model::AyaGen1),
        ("NEXT Pro", "AuthenticAMD", Model::AyaGen2),
        ("AYANEO NEXT Advance", "AuthenticAMD", Model::AyaGen2),
        ("AIR Plus", "GenuineIntel", Model::AyaGen7),
        ("Loki MiniPro", "AuthenticAMD", Model::AynGen3),
        ("ONEXPLAYER 2", "AuthenticAMD", Model::OxpGen5),
        ("ONEXPLAYER 2 Pro", "AuthenticAMD", Model::OxpGen5),
    ];
    for (product, vendor, expected) in cases {
        let model = Model::identify(&dmi_with_product(product), vendor).unwrap();
        assert_eq!(model, expected, "product {product}");
    }
}

#[test]
fn test_identify_rejects_unknown_hardware() {
    assert!(Model::identify(&dmi_with_product("Win600"), "AuthenticAMD").is_err());
    // The AMD AIR Plus is a different board with no chord table here
    assert!(Model::identify(&dmi_with_product("AIR Plus"), "AuthenticAMD").is_err());
}

#[test]
fn test_build_binds_default_actions() {
    let config = ButtonMapConfig::default();
    let profile = Profile::build(Model::AyaGen1, &config);

    let actions: Vec<LogicalAction> = profile.rules.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![
            LogicalAction::Screenshot,
            LogicalAction::QuickMenu,
            LogicalAction::Escape,
            LogicalAction::OnScreenKeyboard,
        ]
    );
    assert_eq!(profile.power_action, PowerAction::Suspend);
    assert_eq!(profile.button_delay.as_millis(), 110);
    assert!(profile.phantom_meta_rule);
}

#[test]
fn test_build_skips_unknown_actions() {
    let mut config = ButtonMapConfig::default();
    config.button_map.button_1 = "BOGUS".to_string();

    let profile = Profile::build(Model::AyaGen1, &config);
    assert_eq!(profile.rules.len(), 3);
    assert_eq!(profile.rules[0].action, LogicalAction::QuickMenu);
}

#[test]
fn test_build_rejects_power_action_in_button_slot() {
    let mut config = ButtonMapConfig::default();
    config.button_map.button_3 = "SUSPEND".to_string();

    let profile = Profile::build(Model::AyaGen1, &config);
    assert!(!profile
        .rules
        .iter()
        .any(|r| r.action == LogicalAction::Escape));
}

#[test]
fn test_power_action_resolution() {
    let mut config = ButtonMapConfig::default();
    config.button_map.power_button = Some("SHUTDOWN".to_string());
    let profile = Profile::build(Model::AynGen3, &config);
    assert_eq!(profile.power_action, PowerAction::Shutdown);

    config.button_map.power_button = Some("BOGUS".to_string());
    let profile = Profile::build(Model::AynGen3, &config);
    assert_eq!(profile.power_action, PowerAction::Suspend);
}

#[test]
fn test_action_payloads() {
    let ActionEvents::Keys(keys) = LogicalAction::Screenshot.events() else {
        panic!("screenshot should synthesize key events");
    };
    assert_eq!(keys, [KeyCode::BTN_MODE.0, KeyCode::BTN_TR.0]);

    let ActionEvents::Keys(keys) = LogicalAction::Escape.events() else {
        panic!("escape should synthesize key events");
    };
    assert_eq!(keys, [KeyCode::KEY_ESC.0]);

    assert_eq!(
        LogicalAction::TogglePerformance.events(),
        ActionEvents::Effect(SideEffect::TogglePerformance)
    );
    assert!(LogicalAction::Guide.is_instant());
    assert!(!LogicalAction::Escape.is_instant());
}

#[test]
fn test_gen2_chords_carry_alternate_patterns() {
    let profile = Profile::build(Model::AyaGen2, &ButtonMapConfig::default());
    assert_eq!(profile.rules.len(), 2);
    for rule in &profile.rules {
        assert_eq!(rule.patterns.len(), 2);
    }
}

#[test]
fn test_oxp_release_set_narrower_than_pattern() {
    let profile = Profile::build(Model::OxpGen5, &ButtonMapConfig::default());
    let rule = &profile.rules[2];
    assert_eq!(rule.patterns[0].len(), 3);
    assert_eq!(rule.release_codes.len(), 2);
    assert!(profile.rules[1].rumble_on_complete);
    assert!(profile.init_sysfs.is_some());
}
