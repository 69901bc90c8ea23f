//! Display backlight stepping through /sys/class/backlight.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

const BACKLIGHT_DIR: &str = "/sys/class/backlight";

/// Brightness change applied per chord press
const STEP: i64 = 10;

pub fn increase() -> Result<(), Box<dyn Error + Send + Sync>> {
    adjust(STEP)
}

pub fn decrease() -> Result<(), Box<dyn Error + Send + Sync>> {
    adjust(-STEP)
}

fn adjust(step: i64) -> Result<(), Box<dyn Error + Send + Sync>> {
    let display = display_path()?;
    let current = read_value(&display, "actual_brightness")?;
    let max = read_value(&display, "max_brightness")?;
    let value = (current + step).clamp(0, max);
    if value == current {
        log::debug!("Display brightness already at {value}. Nothing to do.");
        return Ok(());
    }
    fs::write(display.join("brightness"), format!("{value}\n"))?;
    log::debug!("Set display brightness to {value}");
    Ok(())
}

/// First backlight device that exposes a brightness file
fn display_path() -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
    for entry in fs::read_dir(BACKLIGHT_DIR)? {
        let path = entry?.path();
        if path.join("brightness").exists() {
            return Ok(path);
        }
    }
    Err("no backlight device found".into())
}

fn read_value(display: &Path, name: &str) -> Result<i64, Box<dyn Error + Send + Sync>> {
    let text = fs::read_to_string(display.join(name))?;
    Ok(text.trim().parse()?)
}
