//! Capture tasks for the physical devices that make up a handheld. Each
//! task claims one evdev device with an exclusive grab and runs for the
//! life of the daemon, re-scanning whenever its device disappears.

use std::path::PathBuf;

use evdev::Device;
use tokio::time::sleep;

use crate::constants::DETECT_DELAY;
use crate::hide;
use crate::profile::DeviceMatch;

pub mod gamepad;
pub mod keyboard;
pub mod power;

/// Scan '/dev/input' for an event device matching the given name and
/// physical address.
pub fn find_device(wanted: &DeviceMatch) -> Option<(PathBuf, Device)> {
    for (path, device) in evdev::enumerate() {
        if wanted.matches(&device) {
            return Some((path, device));
        }
    }
    None
}

/// Wait for the given device to appear and grab it for exclusive access.
/// When `hide` is set the device node is also renamed out of '/dev/input'
/// so other input consumers cannot reopen it. Returns the grabbed device
/// and the hidden node name, if any.
pub async fn acquire(wanted: &DeviceMatch, hide: bool) -> (Device, Option<String>) {
    loop {
        let Some((path, mut device)) = find_device(wanted) else {
            log::warn!("{} not found yet. Restarting scan.", wanted.name);
            sleep(DETECT_DELAY).await;
            continue;
        };

        if let Err(e) = device.grab() {
            log::warn!("Failed to grab {}: {e:?}", wanted.name);
            sleep(DETECT_DELAY).await;
            continue;
        }

        let node = if hide {
            match hide::hide_device(&path.display().to_string()) {
                Ok(node) => Some(node),
                Err(e) => {
                    log::warn!("Failed to hide {}: {e:?}", path.display());
                    None
                }
            }
        } else {
            None
        };

        log::info!("Capturing {} at {}", wanted.name, path.display());
        return (device, node);
    }
}

/// Drop the stale hidden node of a device that went away. The kernel
/// recreates the visible node on the next hotplug, so a leftover hidden
/// file would only shadow it.
pub fn discard_hidden(node: Option<String>) {
    let Some(node) = node else {
        return;
    };
    if let Err(e) = hide::remove_hidden(&node) {
        log::warn!("Unable to remove hidden node {node}: {e:?}");
    }
}
