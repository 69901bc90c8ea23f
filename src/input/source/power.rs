//! Power button capture task. The button is grabbed so nothing else in
//! the system acts on it, but its node stays visible. Presses and
//! releases are reported to the session task, which raises the phantom
//! meta guard and runs the configured power action.

use evdev::{Device, EventSummary, KeyCode};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::constants::DETECT_DELAY;
use crate::input::session::SessionCommand;
use crate::profile::DeviceMatch;

use super::find_device;

/// ACPI power button node
const POWER_BUTTON_PRIMARY: DeviceMatch = DeviceMatch {
    name: "Power Button",
    phys: "LNXPWRBN/button/input0",
};

/// Some boards expose a second node for the same physical button. It has
/// to be grabbed too, or the kernel still sees the press.
const POWER_BUTTON_SECONDARY: DeviceMatch = DeviceMatch {
    name: "Power Button",
    phys: "PNP0C0C/button/input0",
};

pub struct PowerCapture {
    session_tx: mpsc::Sender<SessionCommand>,
}

impl PowerCapture {
    pub fn new(session_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { session_tx }
    }

    /// Run the capture loop. Returns when the session task goes away.
    pub async fn run(&mut self) {
        loop {
            let (primary, secondary) = acquire_power_nodes().await;

            let mut primary = match primary.into_event_stream() {
                Ok(events) => events,
                Err(e) => {
                    log::error!("Error reading power button event stream: {e:?}");
                    sleep(DETECT_DELAY).await;
                    continue;
                }
            };
            let mut secondary = secondary.and_then(|device| match device.into_event_stream() {
                Ok(events) => Some(events),
                Err(e) => {
                    log::error!("Error reading alternate power button event stream: {e:?}");
                    None
                }
            });

            loop {
                let event = match secondary.as_mut() {
                    Some(second) => {
                        tokio::select! {
                            event = primary.next_event() => event,
                            event = second.next_event() => event,
                        }
                    }
                    None => primary.next_event().await,
                };
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        log::debug!("Error reading power button event: {e:?}");
                        break;
                    }
                };

                let command = match event.destructure() {
                    EventSummary::Key(_, KeyCode::KEY_POWER, 1) => SessionCommand::PowerPressed,
                    EventSummary::Key(_, KeyCode::KEY_POWER, 0) => SessionCommand::PowerReleased,
                    _ => continue,
                };
                if self.session_tx.send(command).await.is_err() {
                    return;
                }
            }

            log::warn!("Power Button disconnected. Restarting scan.");
            sleep(DETECT_DELAY).await;
        }
    }
}

/// Scan until at least one power button node appears, grabbing every one
/// that is present.
async fn acquire_power_nodes() -> (Device, Option<Device>) {
    loop {
        let mut found = Vec::new();
        for wanted in [POWER_BUTTON_PRIMARY, POWER_BUTTON_SECONDARY] {
            let Some((path, mut device)) = find_device(&wanted) else {
                continue;
            };
            if let Err(e) = device.grab() {
                log::warn!("Failed to grab {}: {e:?}", wanted.phys);
                continue;
            }
            log::info!("Capturing power button at {}", path.display());
            found.push(device);
        }

        let mut found = found.into_iter();
        match found.next() {
            Some(first) => return (first, found.next()),
            None => {
                log::warn!("Power Button not found yet. Restarting scan.");
                sleep(DETECT_DELAY).await;
            }
        }
    }
}
