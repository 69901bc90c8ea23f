//! Keyboard capture task. Every event read from the internal keyboard is
//! handed to the session task for chord resolution together with a
//! snapshot of the keys held at that moment. Nothing reaches the virtual
//! pad directly.

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::constants::DETECT_DELAY;
use crate::input::session::SessionCommand;
use crate::profile::DeviceMatch;

use super::{acquire, discard_hidden};

pub struct KeyboardCapture {
    wanted: DeviceMatch,
    session_tx: mpsc::Sender<SessionCommand>,
}

impl KeyboardCapture {
    pub fn new(wanted: DeviceMatch, session_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { wanted, session_tx }
    }

    /// Run the capture loop. Returns when the session task goes away.
    pub async fn run(&mut self) {
        loop {
            let (device, node) = acquire(&self.wanted, true).await;

            let mut events = match device.into_event_stream() {
                Ok(events) => events,
                Err(e) => {
                    log::error!("Error reading keyboard event stream: {e:?}");
                    discard_hidden(node);
                    sleep(DETECT_DELAY).await;
                    continue;
                }
            };

            loop {
                let event = match events.next_event().await {
                    Ok(event) => event,
                    Err(e) => {
                        log::debug!("Error reading keyboard event: {e:?}");
                        break;
                    }
                };

                // Chord patterns compare against the full set of held
                // keys, not just the key that changed.
                let active_keys = match events.device().get_key_state() {
                    Ok(state) => state.iter().map(|key| key.0).collect(),
                    Err(e) => {
                        log::debug!("Error reading keyboard key state: {e:?}");
                        vec![]
                    }
                };

                let command = SessionCommand::ProcessEvent { event, active_keys };
                if self.session_tx.send(command).await.is_err() {
                    // Session task is gone. Nothing left to do.
                    return;
                }
            }

            log::warn!("{} disconnected. Restarting scan.", self.wanted.name);
            discard_hidden(node);
            sleep(DETECT_DELAY).await;
        }
    }
}
