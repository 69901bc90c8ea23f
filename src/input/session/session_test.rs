use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use evdev::{EventType, InputEvent, KeyCode};

use crate::input::session::{EffectRunner, EventSink, Session, SessionCommand};
use crate::input::source::gamepad::RumbleRequest;
use crate::profile::{
    ChordRule, DeviceMatch, LogicalAction, Model, PowerAction, Profile, SideEffect,
};

static META_CHORD: &[&[u16]] = &[&[KeyCode::KEY_LEFTMETA.0]];
static META_CODES: &[u16] = &[KeyCode::KEY_LEFTMETA.0];
static CTRL_CHORD: &[&[u16]] = &[&[KeyCode::KEY_LEFTCTRL.0]];
static CTRL_CODES: &[u16] = &[KeyCode::KEY_LEFTCTRL.0];
static CTRL_ALT_CHORD: &[&[u16]] = &[&[KeyCode::KEY_LEFTCTRL.0, KeyCode::KEY_LEFTALT.0]];
static ALT_CODES: &[u16] = &[KeyCode::KEY_LEFTALT.0];

/// Records everything the session asks of the pad and the effect
/// handlers so tests can assert on the exact order of emissions.
#[derive(Debug, Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<(u16, i32)>>>,
    effects: Arc<Mutex<Vec<SideEffect>>>,
    power_actions: Arc<Mutex<Vec<PowerAction>>>,
    rumbles: Arc<Mutex<Vec<RumbleRequest>>>,
}

impl Recorder {
    fn events(&self) -> Vec<(u16, i32)> {
        self.events.lock().unwrap().clone()
    }

    fn effects(&self) -> Vec<SideEffect> {
        self.effects.lock().unwrap().clone()
    }

    fn power_actions(&self) -> Vec<PowerAction> {
        self.power_actions.lock().unwrap().clone()
    }

    fn rumbles(&self) -> Vec<RumbleRequest> {
        self.rumbles.lock().unwrap().clone()
    }
}

impl EventSink for Recorder {
    fn emit(&mut self, events: &[InputEvent]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut log = self.events.lock().unwrap();
        for event in events {
            log.push((event.code(), event.value()));
        }
        Ok(())
    }
}

impl EffectRunner for Recorder {
    fn run_effect(&mut self, effect: SideEffect) {
        self.effects.lock().unwrap().push(effect);
    }

    fn run_power_action(&mut self, action: PowerAction) {
        self.power_actions.lock().unwrap().push(action);
    }

    fn rumble(&mut self, request: RumbleRequest) {
        self.rumbles.lock().unwrap().push(request);
    }
}

fn rule(
    action: LogicalAction,
    patterns: &'static [&'static [u16]],
    release_codes: &'static [u16],
) -> ChordRule {
    ChordRule {
        action,
        patterns,
        release_codes,
        rumble_on_complete: false,
        blocked_during_phantom: false,
    }
}

fn profile(rules: Vec<ChordRule>, phantom_meta_rule: bool) -> Profile {
    Profile {
        model: Model::AyaGen1,
        button_delay: Duration::from_millis(1),
        capture_controller: true,
        capture_keyboard: true,
        capture_power: true,
        gamepad: DeviceMatch {
            name: "Microsoft X-Box 360 pad",
            phys: "",
        },
        keyboard: DeviceMatch {
            name: "AT Translated Set 2 keyboard",
            phys: "",
        },
        keyboard_2: None,
        rules,
        phantom_meta_rule,
        init_sysfs: None,
        power_action: PowerAction::Suspend,
    }
}

fn harness(rules: Vec<ChordRule>, phantom_meta_rule: bool) -> (Session<Recorder, Recorder>, Recorder) {
    let recorder = Recorder::default();
    let session = Session::new(
        profile(rules, phantom_meta_rule),
        recorder.clone(),
        recorder.clone(),
    );
    (session, recorder)
}

async fn key(session: &mut Session<Recorder, Recorder>, code: u16, value: i32, active: &[u16]) {
    let event = InputEvent::new(EventType::KEY.0, code, value);
    session.process_event(event, active.to_vec()).await;
}

/// Feed the sync report that follows every hardware event batch
async fn tick(session: &mut Session<Recorder, Recorder>, active: &[u16]) {
    let event = InputEvent::new(EventType::SYNCHRONIZATION.0, 0, 0);
    session.process_event(event, active.to_vec()).await;
}

#[tokio::test]
async fn test_chord_fires_after_release() {
    let (mut session, recorder) = harness(
        vec![rule(LogicalAction::Screenshot, META_CHORD, META_CODES)],
        false,
    );

    // Starting the chord only queues the action
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    assert!(recorder.events().is_empty());

    // The completing release presses the action events in listed order
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::BTN_MODE.0, 1), (KeyCode::BTN_TR.0, 1)]
    );

    // The next report releases them in reverse
    tick(&mut session, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![
            (KeyCode::BTN_MODE.0, 1),
            (KeyCode::BTN_TR.0, 1),
            (KeyCode::BTN_TR.0, 0),
            (KeyCode::BTN_MODE.0, 0),
        ]
    );
}

#[tokio::test]
async fn test_held_chord_fires_once() {
    let (mut session, recorder) = harness(
        vec![rule(LogicalAction::Screenshot, META_CHORD, META_CODES)],
        false,
    );

    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    // Autorepeat while the chord is held must not re-queue or emit
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 2, &[KeyCode::KEY_LEFTMETA.0]).await;
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 2, &[KeyCode::KEY_LEFTMETA.0]).await;
    assert!(recorder.events().is_empty());

    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::BTN_MODE.0, 1), (KeyCode::BTN_TR.0, 1)]
    );
}

#[tokio::test]
async fn test_queued_action_replaces_held_press() {
    let (mut session, recorder) = harness(
        vec![
            rule(LogicalAction::AltTab, CTRL_CHORD, CTRL_CODES),
            rule(LogicalAction::KillWindow, CTRL_ALT_CHORD, ALT_CODES),
        ],
        false,
    );

    // Both chords start before either completes
    key(&mut session, KeyCode::KEY_LEFTCTRL.0, 1, &[KeyCode::KEY_LEFTCTRL.0]).await;
    key(
        &mut session,
        KeyCode::KEY_LEFTALT.0,
        1,
        &[KeyCode::KEY_LEFTCTRL.0, KeyCode::KEY_LEFTALT.0],
    )
    .await;
    key(&mut session, KeyCode::KEY_LEFTCTRL.0, 0, &[KeyCode::KEY_LEFTALT.0]).await;
    assert!(recorder.events().is_empty());

    // The last release completes the second chord first
    key(&mut session, KeyCode::KEY_LEFTALT.0, 0, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::KEY_LEFTMETA.0, 1), (KeyCode::KEY_K.0, 1)]
    );

    // The next report recovers the still queued chord, releasing the
    // held events in reverse before pressing the new ones
    tick(&mut session, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![
            (KeyCode::KEY_LEFTMETA.0, 1),
            (KeyCode::KEY_K.0, 1),
            (KeyCode::KEY_K.0, 0),
            (KeyCode::KEY_LEFTMETA.0, 0),
            (KeyCode::KEY_LEFTALT.0, 1),
            (KeyCode::KEY_TAB.0, 1),
        ]
    );

    tick(&mut session, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![
            (KeyCode::KEY_LEFTMETA.0, 1),
            (KeyCode::KEY_K.0, 1),
            (KeyCode::KEY_K.0, 0),
            (KeyCode::KEY_LEFTMETA.0, 0),
            (KeyCode::KEY_LEFTALT.0, 1),
            (KeyCode::KEY_TAB.0, 1),
            (KeyCode::KEY_TAB.0, 0),
            (KeyCode::KEY_LEFTALT.0, 0),
        ]
    );
}

#[tokio::test]
async fn test_fallback_recovers_missed_release() {
    let mut chord = rule(LogicalAction::Screenshot, CTRL_CHORD, CTRL_CODES);
    chord.rumble_on_complete = true;
    let (mut session, recorder) = harness(vec![chord], false);

    key(&mut session, KeyCode::KEY_LEFTCTRL.0, 1, &[KeyCode::KEY_LEFTCTRL.0]).await;
    // A stray key joins and outlives the chord
    key(
        &mut session,
        KeyCode::KEY_ESC.0,
        1,
        &[KeyCode::KEY_ESC.0, KeyCode::KEY_LEFTCTRL.0],
    )
    .await;
    key(&mut session, KeyCode::KEY_LEFTCTRL.0, 0, &[KeyCode::KEY_ESC.0]).await;
    assert!(recorder.events().is_empty());

    // The final release is not one of the chord's own codes, so the
    // queued action is recovered once everything is up
    key(&mut session, KeyCode::KEY_ESC.0, 0, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::BTN_MODE.0, 1), (KeyCode::BTN_TR.0, 1)]
    );
    // Recovery skips the completion feedback
    assert!(recorder.rumbles().is_empty());
}

#[tokio::test]
async fn test_chord_completion_rumbles_when_configured() {
    let mut chord = rule(LogicalAction::Screenshot, CTRL_CHORD, CTRL_CODES);
    chord.rumble_on_complete = true;
    let (mut session, recorder) = harness(vec![chord], false);

    key(&mut session, KeyCode::KEY_LEFTCTRL.0, 1, &[KeyCode::KEY_LEFTCTRL.0]).await;
    key(&mut session, KeyCode::KEY_LEFTCTRL.0, 0, &[]).await;

    assert_eq!(
        recorder.rumbles(),
        vec![RumbleRequest {
            button: 0,
            interval: 150,
            length: 1000,
            delay: 0,
        }]
    );
}

#[tokio::test]
async fn test_instant_action_presses_on_chord_start() {
    let (mut session, recorder) = harness(
        vec![rule(LogicalAction::Guide, META_CHORD, META_CODES)],
        false,
    );

    // The guide button presses immediately so it can be held
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    assert_eq!(recorder.events(), vec![(KeyCode::BTN_MODE.0, 1)]);

    // Holding it does not release or repeat
    tick(&mut session, &[KeyCode::KEY_LEFTMETA.0]).await;
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 2, &[KeyCode::KEY_LEFTMETA.0]).await;
    assert_eq!(recorder.events(), vec![(KeyCode::BTN_MODE.0, 1)]);

    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    tick(&mut session, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::BTN_MODE.0, 1), (KeyCode::BTN_MODE.0, 0)]
    );
}

#[tokio::test]
async fn test_completing_held_action_does_not_strobe() {
    let (mut session, recorder) = harness(
        vec![rule(LogicalAction::Screenshot, META_CHORD, META_CODES)],
        false,
    );

    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    assert_eq!(recorder.events().len(), 2);

    // A second source can complete the same action before the pad
    // releases it. Only the queue entry clears, the press stays put.
    session.queue.push(LogicalAction::Screenshot);
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    assert_eq!(recorder.events().len(), 2);
    assert!(session.queue.is_empty());

    tick(&mut session, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![
            (KeyCode::BTN_MODE.0, 1),
            (KeyCode::BTN_TR.0, 1),
            (KeyCode::BTN_TR.0, 0),
            (KeyCode::BTN_MODE.0, 0),
        ]
    );
}

#[tokio::test]
async fn test_phantom_meta_swallows_mirrored_press() {
    let mut chord = rule(LogicalAction::Screenshot, META_CHORD, META_CODES);
    chord.blocked_during_phantom = true;
    let (mut session, recorder) = harness(vec![chord], true);

    session.handle_command(SessionCommand::PowerPressed).await;
    assert!(session.phantom_meta);

    // The mirrored meta press and release fire no chord
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    assert!(recorder.events().is_empty());
    assert!(!session.phantom_meta);

    // A real press afterwards works again
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::BTN_MODE.0, 1), (KeyCode::BTN_TR.0, 1)]
    );
}

#[tokio::test]
async fn test_power_release_runs_configured_action() {
    let (mut session, recorder) = harness(vec![], false);

    session.handle_command(SessionCommand::PowerReleased).await;
    assert_eq!(recorder.power_actions(), vec![PowerAction::Suspend]);
}

#[tokio::test]
async fn test_volume_keys_pass_through() {
    let (mut session, recorder) = harness(vec![], false);

    key(&mut session, KeyCode::KEY_VOLUMEUP.0, 1, &[KeyCode::KEY_VOLUMEUP.0]).await;
    key(&mut session, KeyCode::KEY_VOLUMEUP.0, 0, &[]).await;
    assert_eq!(
        recorder.events(),
        vec![(KeyCode::KEY_VOLUMEUP.0, 1), (KeyCode::KEY_VOLUMEUP.0, 0)]
    );
    assert!(recorder.effects().is_empty());
}

#[tokio::test]
async fn test_effect_action_dispatches_on_press_only() {
    let (mut session, recorder) = harness(
        vec![rule(LogicalAction::OnScreenKeyboard, META_CHORD, META_CODES)],
        false,
    );

    key(&mut session, KeyCode::KEY_LEFTMETA.0, 1, &[KeyCode::KEY_LEFTMETA.0]).await;
    key(&mut session, KeyCode::KEY_LEFTMETA.0, 0, &[]).await;
    tick(&mut session, &[]).await;

    assert_eq!(recorder.effects(), vec![SideEffect::OpenKeyboard]);
    assert!(recorder.events().is_empty());
}
