//! Captured device nodes are renamed into a hidden directory under
//! /dev/input so other input consumers cannot enumerate and reopen them
//! while the daemon holds the exclusive grab.

use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

use crate::constants::{DEV_PATH, HIDE_PATH};

/// Move the given device node into the hidden directory. Returns the
/// node name needed to restore it later.
pub fn hide_device(path: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let node = node_name(path)?;
    fs::create_dir_all(HIDE_PATH)?;
    fs::rename(path, Path::new(HIDE_PATH).join(&node))?;
    log::debug!("Hid device node {path}");
    Ok(node)
}

/// Move a hidden device node back to its visible path. Restoring a node
/// that was never hidden is a no-op.
pub fn restore_device(node: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let hidden = Path::new(HIDE_PATH).join(node);
    match fs::rename(&hidden, Path::new(DEV_PATH).join(node)) {
        Ok(()) => {
            log::debug!("Restored device node {node}");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Delete a hidden node whose device went away. The kernel will recreate
/// the visible node on the next hotplug, so a stale hidden file would
/// only shadow it.
pub fn remove_hidden(node: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let hidden = Path::new(HIDE_PATH).join(node);
    match fs::remove_file(&hidden) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Restore every node left in the hidden directory. Used at startup to
/// recover from an unclean exit and at shutdown to hand the devices back.
pub fn restore_all() -> Result<(), Box<dyn Error + Send + Sync>> {
    let entries = match fs::read_dir(HIDE_PATH) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let node = entry.file_name().to_string_lossy().to_string();
        if let Err(err) = restore_device(&node) {
            log::warn!("Unable to restore device node {node}: {err}");
        }
    }
    Ok(())
}

fn node_name(path: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let Some(name) = Path::new(path).file_name() else {
        return Err(format!("Unable to determine node name for {path}").into());
    };
    Ok(name.to_string_lossy().to_string())
}
