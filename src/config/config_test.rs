use std::error::Error;
use std::fs;

use crate::config::{load_or_create, ButtonMapConfig};

fn temp_config_path(tag: &str) -> String {
    let dir = std::env::temp_dir();
    dir.join(format!("chordpad-{tag}-{}.yaml", std::process::id()))
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_default_button_map() {
    let config = ButtonMapConfig::default();
    assert_eq!(config.version, 1);
    assert_eq!(config.button_map.button_1, "SCR");
    assert_eq!(config.button_map.button_2, "QAM");
    assert_eq!(config.button_map.button_5, "MODE");
    assert_eq!(config.button_map.button_8, "MODE");
    assert_eq!(config.button_map.button_12, "TOGGLE_GYRO");
    assert_eq!(
        config.button_map.power_button,
        Some("SUSPEND".to_string())
    );
    assert!(!config.is_out_of_date());
}

#[test]
fn test_from_yaml() -> Result<(), Box<dyn Error>> {
    let content = r#"
version: 1
button_map:
  button_1: SCR
  button_2: QAM
  button_3: ESC
  button_4: OSK
  button_5: MODE
  button_6: OPEN_CHIMERA
  button_7: TOGGLE_PERFORMANCE
  button_8: MODE
  button_9: TOGGLE_MOUSE
  button_10: ALT_TAB
  button_11: KILL
  button_12: TOGGLE_GYRO
  power_button: SHUTDOWN
"#;
    let config = ButtonMapConfig::from_yaml(content.to_string())?;
    assert_eq!(config.button_map.button_11, "KILL");
    assert_eq!(
        config.button_map.power_button,
        Some("SHUTDOWN".to_string())
    );
    Ok(())
}

#[test]
fn test_missing_power_button_is_out_of_date() -> Result<(), Box<dyn Error>> {
    let content = r#"
version: 1
button_map:
  button_1: SCR
  button_2: QAM
  button_3: ESC
  button_4: OSK
  button_5: MODE
  button_6: OPEN_CHIMERA
  button_7: TOGGLE_PERFORMANCE
  button_8: MODE
  button_9: TOGGLE_MOUSE
  button_10: ALT_TAB
  button_11: KILL
  button_12: TOGGLE_GYRO
"#;
    let config = ButtonMapConfig::from_yaml(content.to_string())?;
    assert!(config.is_out_of_date());
    Ok(())
}

#[test]
fn test_load_or_create_writes_defaults() -> Result<(), Box<dyn Error>> {
    let path = temp_config_path("create");
    let _ = fs::remove_file(&path);

    let config = load_or_create(&path)?;
    assert_eq!(config, ButtonMapConfig::default());

    // A second load should read the file that was just written
    let reloaded = load_or_create(&path)?;
    assert_eq!(reloaded, config);

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_load_or_create_regenerates_stale_config() -> Result<(), Box<dyn Error>> {
    let path = temp_config_path("stale");
    let content = r#"
version: 1
button_map:
  button_1: KILL
  button_2: QAM
  button_3: ESC
  button_4: OSK
  button_5: MODE
  button_6: OPEN_CHIMERA
  button_7: TOGGLE_PERFORMANCE
  button_8: MODE
  button_9: TOGGLE_MOUSE
  button_10: ALT_TAB
  button_11: KILL
  button_12: TOGGLE_GYRO
"#;
    fs::write(&path, content)?;

    let config = load_or_create(&path)?;
    assert_eq!(config, ButtonMapConfig::default());

    let on_disk = ButtonMapConfig::from_yaml_file(path.clone())?;
    assert!(!on_disk.is_out_of_date());

    fs::remove_file(&path)?;
    Ok(())
}
