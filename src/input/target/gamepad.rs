//! Virtual X-Box 360 style pad that is presented to games and overlays in
//! place of the captured physical devices.

use std::{
    error::Error,
    os::fd::AsRawFd,
    sync::{Arc, Mutex},
    thread,
};

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, EventSummary, FFEffectCode, FFStatusCode,
    InputEvent, InputId, KeyCode, SynchronizationCode, SynchronizationEvent, UInputCode,
    UinputAbsSetup,
};
use nix::fcntl::{FcntlArg, OFlag};
use tokio::{sync::mpsc, time::Duration};

use crate::input::session::EventSink;
use crate::input::source::gamepad::FFCommand;

/// Name the virtual pad advertises on its device node
pub const DEVICE_NAME: &str = "Handheld Controller";

/// Identity of a wired Microsoft X-Box 360 pad. Keeping the xpad identity
/// means Steam Input and game controller profiles keep working unchanged.
const VENDOR_ID: u16 = 0x045e;
const PRODUCT_ID: u16 = 0x028e;
const VERSION_ID: u16 = 0x110;

/// How long to sleep before polling for force feedback events.
const POLL_RATE: Duration = Duration::from_micros(1666);

/// Write handle for the virtual pad. Clones share one uinput device, so
/// every capture task funnels its surviving events onto a single node.
#[derive(Debug, Clone)]
pub struct VirtualGamepad {
    device: Arc<Mutex<VirtualDevice>>,
}

impl VirtualGamepad {
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let device = create_virtual_device()?;
        Ok(Self {
            device: Arc::new(Mutex::new(device)),
        })
    }

    /// Emit the given events followed by a synchronization report.
    pub fn emit(&self, events: &[InputEvent]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut device = self.device.lock().map_err(|e| e.to_string())?;
        device.emit(events)?;
        device.emit(&[
            SynchronizationEvent::new(SynchronizationCode::SYN_REPORT, 0).into(),
        ])?;
        Ok(())
    }

    /// Spawns the force-feedback handler thread. Force feedback events from
    /// games are read off the virtual device and forwarded to the physical
    /// controller over the given channel.
    pub fn spawn_ff_handler(&self, controller_tx: mpsc::Sender<FFCommand>) {
        let ff_device = self.device.clone();
        tokio::task::spawn_blocking(move || {
            loop {
                // Check to see if the rest of the daemon still has a
                // reference to the virtual device. If it does not, it means
                // the device has stopped.
                let num_refs = Arc::strong_count(&ff_device);
                if num_refs == 1 {
                    log::debug!("Virtual device stopped. Stopping FF handler thread.");
                    break;
                }

                // Read any events
                if let Err(e) = process_ff(&ff_device, &controller_tx) {
                    log::warn!("Error processing FF events: {:?}", e);
                }

                // Sleep for the poll rate interval
                thread::sleep(POLL_RATE);
            }
        });
    }
}

impl EventSink for VirtualGamepad {
    fn emit(&mut self, events: &[InputEvent]) -> Result<(), Box<dyn Error + Send + Sync>> {
        VirtualGamepad::emit(self, events)
    }
}

/// Process force feedback events from the given virtual device
fn process_ff(
    device: &Arc<Mutex<VirtualDevice>>,
    controller_tx: &mpsc::Sender<FFCommand>,
) -> Result<(), Box<dyn Error>> {
    // Listen for events (Force Feedback Events)
    let events = match device.lock() {
        Ok(mut dev) => {
            let res = dev.fetch_events();
            match res {
                Ok(events) => events.collect(),
                Err(err) => match err.kind() {
                    // Do nothing if this would block
                    std::io::ErrorKind::WouldBlock => vec![],
                    _ => {
                        log::trace!("Failed to fetch events: {:?}", err);
                        return Err(err.into());
                    }
                },
            }
        }
        Err(err) => {
            log::trace!("Failed to lock device mutex: {:?}", err);
            return Err(err.to_string().into());
        }
    };

    const STOPPED: i32 = FFStatusCode::FF_STATUS_STOPPED.0 as i32;
    const PLAYING: i32 = FFStatusCode::FF_STATUS_PLAYING.0 as i32;

    // Process the events
    for event in events {
        match event.destructure() {
            EventSummary::UInput(event, UInputCode::UI_FF_UPLOAD, ..) => {
                log::debug!("Got FF upload event");
                // Claim ownership of the FF upload and convert it to a
                // FF_UPLOAD event
                let mut event = device
                    .lock()
                    .map_err(|e| e.to_string())?
                    .process_ff_upload(event)?;
                let effect_id = event.effect_id();

                log::debug!("Upload effect: {:?} with id {}", event.effect(), effect_id);

                // Send the effect data to be uploaded to the controller and
                // wait for an effect ID to be assigned.
                let (tx, rx) = std::sync::mpsc::channel::<Option<i16>>();
                let upload = FFCommand::Upload {
                    id: effect_id,
                    data: event.effect(),
                    id_tx: tx,
                };
                if let Err(e) = controller_tx.blocking_send(upload) {
                    event.set_retval(-1);
                    return Err(e.into());
                }
                let effect_id = match rx.recv_timeout(Duration::from_secs(1)) {
                    Ok(id) => id,
                    Err(e) => {
                        event.set_retval(-1);
                        return Err(e.into());
                    }
                };

                // Set the effect ID for the FF effect
                if let Some(id) = effect_id {
                    event.set_effect_id(id);
                    event.set_retval(0);
                } else {
                    log::warn!("Failed to get effect ID to upload FF effect");
                    event.set_retval(-1);
                }
            }
            EventSummary::UInput(event, UInputCode::UI_FF_ERASE, ..) => {
                log::debug!("Got FF erase event");
                // Claim ownership of the FF erase and convert it to a
                // FF_ERASE event.
                let event = device
                    .lock()
                    .map_err(|e| e.to_string())?
                    .process_ff_erase(event)?;
                log::debug!("Erase effect: {:?}", event.effect_id());

                controller_tx.blocking_send(FFCommand::Erase {
                    id: event.effect_id() as i16,
                })?;
            }
            EventSummary::ForceFeedback(.., effect_id, STOPPED) => {
                log::debug!("Stopped effect ID: {}", effect_id.0);
                controller_tx.blocking_send(FFCommand::Play {
                    id: effect_id.0 as i16,
                    value: event.value(),
                })?;
            }
            EventSummary::ForceFeedback(.., effect_id, PLAYING) => {
                log::debug!("Playing effect ID: {}", effect_id.0);
                controller_tx.blocking_send(FFCommand::Play {
                    id: effect_id.0 as i16,
                    value: event.value(),
                })?;
            }
            _ => {
                log::debug!("Unhandled event: {:?}", event);
            }
        }
    }

    Ok(())
}

/// Create the virtual pad with a fixed capability set matching the wired
/// X-Box 360 pad, plus the keyboard keys written by chord actions and the
/// volume passthrough.
fn create_virtual_device() -> Result<VirtualDevice, Box<dyn Error + Send + Sync>> {
    // Setup Key inputs
    let mut keys = AttributeSet::<KeyCode>::new();
    keys.insert(KeyCode::BTN_SOUTH);
    keys.insert(KeyCode::BTN_EAST);
    keys.insert(KeyCode::BTN_NORTH);
    keys.insert(KeyCode::BTN_WEST);
    keys.insert(KeyCode::BTN_TL);
    keys.insert(KeyCode::BTN_TR);
    keys.insert(KeyCode::BTN_SELECT);
    keys.insert(KeyCode::BTN_START);
    keys.insert(KeyCode::BTN_MODE);
    keys.insert(KeyCode::BTN_THUMBL);
    keys.insert(KeyCode::BTN_THUMBR);
    keys.insert(KeyCode::BTN_TRIGGER_HAPPY1);
    keys.insert(KeyCode::BTN_TRIGGER_HAPPY2);
    keys.insert(KeyCode::BTN_TRIGGER_HAPPY3);
    keys.insert(KeyCode::BTN_TRIGGER_HAPPY4);

    // Keyboard keys emitted by chord actions and the volume passthrough
    keys.insert(KeyCode::KEY_ESC);
    keys.insert(KeyCode::KEY_TAB);
    keys.insert(KeyCode::KEY_K);
    keys.insert(KeyCode::KEY_LEFTALT);
    keys.insert(KeyCode::KEY_LEFTMETA);
    keys.insert(KeyCode::KEY_VOLUMEDOWN);
    keys.insert(KeyCode::KEY_VOLUMEUP);

    // Setup ABS inputs
    let joystick_setup = AbsInfo::new(0, -32768, 32767, 16, 128, 1);
    let abs_x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, joystick_setup);
    let abs_y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, joystick_setup);
    let abs_rx = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RX, joystick_setup);
    let abs_ry = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RY, joystick_setup);
    let triggers_setup = AbsInfo::new(0, 0, 255, 0, 0, 1);
    let abs_z = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Z, triggers_setup);
    let abs_rz = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RZ, triggers_setup);
    let dpad_setup = AbsInfo::new(0, -1, 1, 0, 0, 1);
    let abs_hat0x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_HAT0X, dpad_setup);
    let abs_hat0y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_HAT0Y, dpad_setup);

    // Setup Force Feedback
    let mut ff = AttributeSet::<FFEffectCode>::new();
    ff.insert(FFEffectCode::FF_RUMBLE);
    ff.insert(FFEffectCode::FF_PERIODIC);
    ff.insert(FFEffectCode::FF_SQUARE);
    ff.insert(FFEffectCode::FF_TRIANGLE);
    ff.insert(FFEffectCode::FF_SINE);
    ff.insert(FFEffectCode::FF_GAIN);

    // Identify as a wired X-Box 360 pad
    let id = InputId::new(BusType(3), VENDOR_ID, PRODUCT_ID, VERSION_ID);

    // Build the device
    let device = VirtualDeviceBuilder::new()?
        .name(DEVICE_NAME)
        .input_id(id)
        .with_keys(&keys)?
        .with_absolute_axis(&abs_x)?
        .with_absolute_axis(&abs_y)?
        .with_absolute_axis(&abs_rx)?
        .with_absolute_axis(&abs_ry)?
        .with_absolute_axis(&abs_z)?
        .with_absolute_axis(&abs_rz)?
        .with_absolute_axis(&abs_hat0x)?
        .with_absolute_axis(&abs_hat0y)?
        .with_ff(&ff)?
        .build()?;

    // Set the device to do non-blocking reads so the force feedback poll
    // loop does not stall writers.
    let raw_fd = device.as_raw_fd();
    nix::fcntl::fcntl(raw_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK))?;

    Ok(device)
}
