//! The session owns every piece of chord state: the action queue, the
//! single hot slot on the virtual pad, and the phantom meta guard. All
//! captured keyboard events and power button reports funnel through one
//! task here, so chord resolution never races itself.

pub mod queue;

#[cfg(test)]
pub mod session_test;

use std::error::Error;

use evdev::{EventType, InputEvent, KeyCode};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::input::source::gamepad::RumbleRequest;
use crate::profile::{ActionEvents, LogicalAction, PowerAction, Profile, SideEffect};

use queue::ActionQueue;

/// Size of the [SessionCommand] buffer for receiving device events
const BUFFER_SIZE: usize = 2048;

/// Rumble pulse played when a chord completes with feedback enabled
const COMPLETE_RUMBLE: RumbleRequest = RumbleRequest {
    button: 0,
    interval: 150,
    length: 1000,
    delay: 0,
};

/// Messages processed by the session task
#[derive(Debug)]
pub enum SessionCommand {
    /// A captured keyboard event plus the keys held when it fired
    ProcessEvent {
        event: InputEvent,
        active_keys: Vec<u16>,
    },
    PowerPressed,
    PowerReleased,
}

/// Sink for synthesized input events. The daemon wires this to the
/// virtual pad; tests substitute a recorder.
pub trait EventSink {
    fn emit(&mut self, events: &[InputEvent]) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Runs the consequences of chords that are not input events: launching
/// applications, power management, rumble feedback.
pub trait EffectRunner {
    fn run_effect(&mut self, effect: SideEffect);
    fn run_power_action(&mut self, action: PowerAction);
    fn rumble(&mut self, request: RumbleRequest);
}

/// How a single tick resolved against the chord table
enum Resolution {
    /// A chord started and its action should be queued
    Start { rule: usize },
    /// A chord completed, either through one of its release codes or by
    /// recovering the oldest queued action once every key was up
    Complete { action: LogicalAction, rumble: bool },
    None,
}

pub struct Session<S: EventSink, E: EffectRunner> {
    profile: Profile,
    sink: S,
    effects: E,
    queue: ActionQueue,
    /// Action whose synthesized press the pad currently holds
    last_action: Option<LogicalAction>,
    /// Set while a power button press may mirror a stray meta key
    phantom_meta: bool,
    tx: mpsc::Sender<SessionCommand>,
    rx: mpsc::Receiver<SessionCommand>,
}

impl<S: EventSink, E: EffectRunner> Session<S, E> {
    pub fn new(profile: Profile, sink: S, effects: E) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        Self {
            profile,
            sink,
            effects,
            queue: ActionQueue::new(),
            last_action: None,
            phantom_meta: false,
            tx,
            rx,
        }
    }

    /// Returns a transmitter channel that can be used to send events to
    /// this session
    pub fn transmitter(&self) -> mpsc::Sender<SessionCommand> {
        self.tx.clone()
    }

    /// Serve commands until every transmitter is gone
    pub async fn run(&mut self) {
        while let Some(command) = self.rx.recv().await {
            self.handle_command(command).await;
        }
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ProcessEvent { event, active_keys } => {
                self.process_event(event, active_keys).await;
            }
            SessionCommand::PowerPressed => {
                log::debug!("Power button pressed");
                self.phantom_meta = true;
            }
            SessionCommand::PowerReleased => {
                log::info!("Power button released. Running the configured power action.");
                self.effects.run_power_action(self.profile.power_action);
            }
        }
    }

    /// Feed one captured keyboard event through the chord engine
    async fn process_event(&mut self, event: InputEvent, active_keys: Vec<u16>) {
        // Volume keys pass straight through to the pad
        if event.event_type() == EventType::KEY {
            let code = KeyCode(event.code());
            if code == KeyCode::KEY_VOLUMEDOWN || code == KeyCode::KEY_VOLUMEUP {
                if let Err(e) = self.sink.emit(&[event]) {
                    log::error!("Failed to pass through volume key: {e:?}");
                }
            }
        }

        let mut resolution = self.resolve(&event, &active_keys);

        // Recover a queued action whose completing release went missing
        if matches!(resolution, Resolution::None) && active_keys.is_empty() {
            if let Some(action) = self.queue.front() {
                resolution = Resolution::Complete {
                    action,
                    rumble: false,
                };
            }
        }

        self.apply(resolution).await;
    }

    /// Resolve one keyboard event against the chord table. Only key
    /// events can match, and the first rule to match wins.
    fn resolve(&mut self, event: &InputEvent, active_keys: &[u16]) -> Resolution {
        if event.event_type() != EventType::KEY {
            return Resolution::None;
        }
        let code = event.code();
        let value = event.value();

        for (index, rule) in self.profile.rules.iter().enumerate() {
            // A chord starts when the held keys exactly match one of its
            // patterns.
            if value == 1
                && !self.queue.contains(rule.action)
                && !(rule.blocked_during_phantom && self.phantom_meta)
                && rule.patterns.iter().any(|pattern| *pattern == active_keys)
            {
                return Resolution::Start { rule: index };
            }

            // A started chord completes when one of its release codes
            // goes up and no key is left held.
            if value == 0
                && active_keys.is_empty()
                && self.queue.contains(rule.action)
                && rule.release_codes.contains(&code)
            {
                return Resolution::Complete {
                    action: rule.action,
                    rumble: rule.rumble_on_complete,
                };
            }
        }

        // The power button mirrors its press as a stray meta key on some
        // keyboards. Swallow the stray release so it cannot fire a chord.
        if self.profile.phantom_meta_rule
            && self.phantom_meta
            && self.queue.is_empty()
            && active_keys.is_empty()
            && value == 0
            && code == KeyCode::KEY_LEFTMETA.0
        {
            log::debug!("Dropping mirrored meta release from the power button");
            self.phantom_meta = false;
        }

        Resolution::None
    }

    /// Act on a tick's resolution
    async fn apply(&mut self, resolution: Resolution) {
        if let Resolution::Complete { action, rumble } = resolution {
            if action.is_instant() {
                self.queue.remove(action);
                self.emit_action(action, 0).await;
            } else {
                self.promote(action).await;
            }
            if rumble {
                self.effects.rumble(COMPLETE_RUMBLE);
            }
            return;
        }

        if let Resolution::Start { rule } = resolution {
            let action = self.profile.rules[rule].action;
            self.queue.push(action);
            if action.is_instant() {
                self.emit_action(action, 1).await;
            }
        }

        // Any tick that completes nothing releases whatever the pad
        // still holds from the previous chord.
        self.demote().await;
    }

    /// Move a completed action into the hot slot and press its events.
    /// Completing the action the slot already holds only clears its
    /// queue entry, so a held chord cannot strobe the pad.
    async fn promote(&mut self, action: LogicalAction) {
        match self.last_action {
            None => {
                self.queue.remove(action);
                self.last_action = Some(action);
                self.emit_action(action, 1).await;
            }
            Some(held) if held == action => {
                self.queue.remove(action);
            }
            Some(held) => {
                self.emit_action(held, 0).await;
                self.queue.remove(action);
                self.last_action = Some(action);
                self.emit_action(action, 1).await;
            }
        }
    }

    /// Release whatever the hot slot holds
    async fn demote(&mut self) {
        let Some(held) = self.last_action.take() else {
            return;
        };
        self.emit_action(held, 0).await;
    }

    /// Emit the press or release half of an action. Side effect actions
    /// dispatch their handler on press and do nothing on release.
    async fn emit_action(&mut self, action: LogicalAction, value: i32) {
        match action.events() {
            ActionEvents::Keys(codes) => self.emit_keys(codes, value).await,
            ActionEvents::Effect(effect) => {
                if value == 0 {
                    log::debug!("Effect actions have no release half. Skipping.");
                    return;
                }
                self.effects.run_effect(effect);
            }
        }
    }

    /// Write key events to the pad, pacing multi-event bursts so games
    /// poll each change. Presses go out in listed order, releases in
    /// reverse.
    async fn emit_keys(&mut self, codes: &'static [u16], value: i32) {
        if codes.is_empty() {
            log::error!("Received an empty event list. No action.");
            return;
        }

        let codes: Vec<u16> = if value == 0 {
            codes.iter().rev().copied().collect()
        } else {
            codes.to_vec()
        };

        let last = codes.len() - 1;
        for (index, code) in codes.iter().enumerate() {
            let event = InputEvent::new(EventType::KEY.0, *code, value);
            if let Err(e) = self.sink.emit(&[event]) {
                log::error!("Failed to emit events to virtual pad: {e:?}");
            }
            // Pause between multiple events, but not after the last one.
            if index != last {
                sleep(self.profile.button_delay).await;
            }
        }
    }
}
