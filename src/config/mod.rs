#[cfg(test)]
pub mod config_test;

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents all possible errors loading a [ButtonMapConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// User-editable mapping from the vendor button slots of a handheld to
/// named actions. Slots that a given model does not have are ignored.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ButtonMapConfig {
    pub version: u32,
    pub button_map: ButtonMap,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ButtonMap {
    pub button_1: String,
    pub button_2: String,
    pub button_3: String,
    pub button_4: String,
    pub button_5: String,
    pub button_6: String,
    pub button_7: String,
    pub button_8: String,
    pub button_9: String,
    pub button_10: String,
    pub button_11: String,
    pub button_12: String,
    /// Added after the first release, so older config files may lack it.
    pub power_button: Option<String>,
}

impl Default for ButtonMapConfig {
    fn default() -> Self {
        Self {
            version: 1,
            button_map: ButtonMap {
                button_1: "SCR".to_string(),
                button_2: "QAM".to_string(),
                button_3: "ESC".to_string(),
                button_4: "OSK".to_string(),
                button_5: "MODE".to_string(),
                button_6: "OPEN_CHIMERA".to_string(),
                button_7: "TOGGLE_PERFORMANCE".to_string(),
                button_8: "MODE".to_string(),
                button_9: "TOGGLE_MOUSE".to_string(),
                button_10: "ALT_TAB".to_string(),
                button_11: "KILL".to_string(),
                button_12: "TOGGLE_GYRO".to_string(),
                power_button: Some("SUSPEND".to_string()),
            },
        }
    }
}

impl ButtonMapConfig {
    /// Load a [ButtonMapConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<ButtonMapConfig, LoadError> {
        let config: ButtonMapConfig = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [ButtonMapConfig] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<ButtonMapConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: ButtonMapConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Write this [ButtonMapConfig] to the given YAML file
    pub fn save(&self, path: &str) -> Result<(), LoadError> {
        if let Some(dir) = Path::new(path).parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns true if this config predates the power button slot and
    /// needs to be regenerated.
    pub fn is_out_of_date(&self) -> bool {
        self.button_map.power_button.is_none()
    }
}

/// Load the button map from the given path, writing a fresh default
/// config if the file is missing or predates the power button slot.
pub fn load_or_create(path: &str) -> Result<ButtonMapConfig, LoadError> {
    if !Path::new(path).exists() {
        log::info!("No config found at {path}, writing defaults");
        let config = ButtonMapConfig::default();
        config.save(path)?;
        return Ok(config);
    }

    let config = ButtonMapConfig::from_yaml_file(path.to_string())?;
    if config.is_out_of_date() {
        log::warn!("Config file out of date. Generating a new one.");
        let config = ButtonMapConfig::default();
        config.save(path)?;
        return Ok(config);
    }

    Ok(config)
}
