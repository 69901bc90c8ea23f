//! Controller capture task. Button and axis events pass straight through
//! to the virtual pad. Force feedback flows the other way: requests read
//! off the virtual pad are serviced here against the physical device.

use std::collections::HashMap;
use std::error::Error;

use evdev::{
    Device, EventType, FFEffect, FFEffectData, FFEffectKind, FFReplay, FFTrigger, InputEvent,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use crate::constants::DETECT_DELAY;
use crate::input::target::gamepad::VirtualGamepad;
use crate::profile::DeviceMatch;

use super::{acquire, discard_hidden};

/// Size of the [FFCommand] buffer for receiving force feedback requests
const BUFFER_SIZE: usize = 2048;

/// Force feedback requests serviced against the physical controller
#[derive(Debug)]
pub enum FFCommand {
    /// Upload or update an effect. Answers with the controller's effect
    /// id, or None when the upload failed.
    Upload {
        id: i16,
        data: FFEffectData,
        id_tx: std::sync::mpsc::Sender<Option<i16>>,
    },
    Erase {
        id: i16,
    },
    Play {
        id: i16,
        value: i32,
    },
    Rumble(RumbleRequest),
}

/// One-shot rumble pulse played by the daemon itself for feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleRequest {
    pub button: u16,
    /// Milliseconds to let the pulse play before erasing it
    pub interval: u16,
    pub length: u16,
    pub delay: u16,
}

impl Default for RumbleRequest {
    fn default() -> Self {
        Self {
            button: 0,
            interval: 10,
            length: 1000,
            delay: 0,
        }
    }
}

pub struct ControllerCapture {
    wanted: DeviceMatch,
    pad: VirtualGamepad,
    tx: mpsc::Sender<FFCommand>,
    rx: mpsc::Receiver<FFCommand>,
}

impl ControllerCapture {
    pub fn new(wanted: DeviceMatch, pad: VirtualGamepad) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        Self {
            wanted,
            pad,
            tx,
            rx,
        }
    }

    /// Returns a transmitter channel that can be used to send force
    /// feedback requests to this device
    pub fn transmitter(&self) -> mpsc::Sender<FFCommand> {
        self.tx.clone()
    }

    /// Run the capture loop, serving the event stream and the force
    /// feedback channel until the device goes away.
    pub async fn run(&mut self) {
        loop {
            let (device, node) = acquire(&self.wanted, true).await;

            let mut events = match device.into_event_stream() {
                Ok(events) => events,
                Err(e) => {
                    log::error!("Error reading controller event stream: {e:?}");
                    discard_hidden(node);
                    sleep(DETECT_DELAY).await;
                    continue;
                }
            };

            // Effects uploaded to this connection. Dropping a handle
            // erases its effect from the device.
            let mut effects: HashMap<i16, FFEffect> = HashMap::new();

            loop {
                tokio::select! {
                    event = events.next_event() => {
                        match event {
                            Ok(event) => self.forward(event),
                            Err(e) => {
                                log::debug!("Error reading controller event: {e:?}");
                                break;
                            }
                        }
                    }
                    command = self.rx.recv() => {
                        let Some(command) = command else {
                            return;
                        };
                        handle_ff(events.device_mut(), &mut effects, command).await;
                    }
                }
            }

            log::warn!("{} disconnected. Restarting scan.", self.wanted.name);
            discard_hidden(node);
            sleep(DETECT_DELAY).await;
        }
    }

    /// Forward a controller event to the virtual pad. Force feedback and
    /// uinput control events flow the other way and are never forwarded.
    fn forward(&self, event: InputEvent) {
        let event_type = event.event_type();
        if event_type == EventType::FORCEFEEDBACK
            || event_type == EventType::FORCEFEEDBACKSTATUS
            || event_type == EventType::UINPUT
        {
            return;
        }
        // The pad syncs after every write, so source sync reports are
        // dropped rather than doubled up.
        if event_type == EventType::SYNCHRONIZATION {
            return;
        }

        if let Err(e) = self.pad.emit(&[event]) {
            log::error!("Failed to forward controller event: {e:?}");
        }
    }
}

/// Service one force feedback request against the physical controller
async fn handle_ff(device: &mut Device, effects: &mut HashMap<i16, FFEffect>, command: FFCommand) {
    match command {
        FFCommand::Upload { id, data, id_tx } => {
            // Re-uploading a known effect updates it in place
            if let Some(effect) = effects.get_mut(&id) {
                let result = match effect.update(data) {
                    Ok(()) => Some(id),
                    Err(e) => {
                        log::error!("Failed to update effect {id}: {e:?}");
                        None
                    }
                };
                let _ = id_tx.send(result);
                return;
            }

            match device.upload_ff_effect(data) {
                Ok(effect) => {
                    let id = effect.id() as i16;
                    effects.insert(id, effect);
                    let _ = id_tx.send(Some(id));
                }
                Err(e) => {
                    log::error!("Failed to upload effect: {e:?}");
                    let _ = id_tx.send(None);
                }
            }
        }
        FFCommand::Erase { id } => {
            if effects.remove(&id).is_none() {
                log::warn!("Unable to find existing FF effect with id {id}");
            }
        }
        FFCommand::Play { id, value } => {
            let Some(effect) = effects.get_mut(&id) else {
                log::warn!("Received FF event with unknown id: {id}");
                return;
            };
            let result = if value > 0 {
                effect.play(value)
            } else {
                effect.stop()
            };
            if let Err(e) = result {
                log::error!("Failed to play effect {id}: {e:?}");
            }
        }
        FFCommand::Rumble(request) => {
            if let Err(e) = rumble(device, request).await {
                log::error!("Failed to rumble controller: {e:?}");
            }
        }
    }
}

/// Upload a rumble effect, play it once, and erase it again after letting
/// it run for the requested interval.
async fn rumble(
    device: &mut Device,
    request: RumbleRequest,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let effect_data = FFEffectData {
        direction: 0,
        trigger: FFTrigger {
            button: request.button,
            interval: request.interval,
        },
        replay: FFReplay {
            length: request.length,
            delay: request.delay,
        },
        kind: FFEffectKind::Rumble {
            strong_magnitude: 0x0000,
            weak_magnitude: 0xffff,
        },
    };

    let mut effect = device.upload_ff_effect(effect_data)?;
    effect.play(1)?;
    sleep(Duration::from_millis(request.interval.into())).await;

    // The effect erases itself when the handle drops
    Ok(())
}
