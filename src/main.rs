use std::env;
use std::error::Error;
use std::path::Path;
use std::process;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};

use crate::config::load_or_create;
use crate::constants::CONFIG_PATH;
use crate::effects::Dispatcher;
use crate::input::session::Session;
use crate::input::source::gamepad::ControllerCapture;
use crate::input::source::keyboard::KeyboardCapture;
use crate::input::source::power::PowerCapture;
use crate::input::target::gamepad::VirtualGamepad;
use crate::profile::{Model, Profile};

mod config;
mod constants;
mod dmi;
mod effects;
mod hide;
mod input;
mod profile;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the button map configuration file
    #[arg(long, default_value = CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = Args::parse();

    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting Chordpad v{}", VERSION);

    // Grabbing input devices and writing to sysfs both need root.
    if !nix::unistd::geteuid().is_root() {
        return Err("chordpad must be run as root".into());
    }

    // OpenGamepadUI grabs the same devices, so the two cannot coexist.
    if is_process_running("opengamepadui")? {
        log::warn!("Detected an OpenGamepadUI process. Input management not possible. Exiting.");
        process::exit(0);
    }

    // Hand back any nodes a previous run left hidden.
    if let Err(e) = hide::restore_all() {
        log::warn!("Unable to restore hidden devices: {:?}", e);
    }

    // Setup handlers for the shutdown signals
    tokio::spawn(async move {
        wait_for_exit_signal().await;
        log::info!("Received exit signal. Restoring devices.");
        if let Err(e) = hide::restore_all() {
            log::error!("Unable to restore hidden devices: {:?}", e);
        }
        log::info!("Shutting down");
        process::exit(0);
    });

    let user = effects::discover_user().await;

    // Identify the handheld
    let dmi_data = dmi::get_dmi_data();
    log::debug!("Detected DMI data: {:?}", dmi_data);
    let cpu_info = dmi::get_cpu_info()?;
    let cpu_vendor = cpu_info.vendor_id(0).unwrap_or_default();
    let model = Model::identify(&dmi_data, cpu_vendor)?;
    log::info!("Identified host system as {model:?}");

    // Bind the model's chord table to the user's button map
    let config = load_or_create(&args.config)?;
    let profile = Profile::build(model, &config);

    // Some models need a platform switch flipped before their extra
    // buttons report through the keyboard at all.
    if let Some(path) = profile.init_sysfs {
        if Path::new(path).exists() {
            if let Err(e) = std::fs::write(path, "1") {
                log::warn!("Unable to initialize {path}: {:?}", e);
            }
        }
    }

    // The virtual pad games will see
    let pad = VirtualGamepad::new()?;

    // Physical controller capture plus its force feedback relay
    let controller = ControllerCapture::new(profile.gamepad, pad.clone());
    let controller_tx = controller.transmitter();
    pad.spawn_ff_handler(controller_tx.clone());

    let mut session = Session::new(
        profile.clone(),
        pad.clone(),
        Dispatcher::new(user, controller_tx),
    );
    let session_tx = session.transmitter();

    if profile.capture_controller {
        let mut controller = controller;
        tokio::spawn(async move {
            controller.run().await;
        });
    }

    if profile.capture_keyboard {
        let mut keyboard = KeyboardCapture::new(profile.keyboard, session_tx.clone());
        tokio::spawn(async move {
            keyboard.run().await;
        });
        if let Some(wanted) = profile.keyboard_2 {
            let mut keyboard_2 = KeyboardCapture::new(wanted, session_tx.clone());
            tokio::spawn(async move {
                keyboard_2.run().await;
            });
        }
    }

    if profile.capture_power {
        let mut power = PowerCapture::new(session_tx.clone());
        tokio::spawn(async move {
            power.run().await;
        });
    }

    session.run().await;

    log::info!("Chordpad stopped");

    Ok(())
}

/// Returns true when a process with the given name is running.
fn is_process_running(name: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    for process in procfs::process::all_processes()? {
        let Ok(process) = process else {
            continue;
        };
        let Ok(cmdline) = process.cmdline() else {
            continue;
        };
        if cmdline.iter().any(|arg| arg.contains(name)) {
            log::debug!("Process {name} is running.");
            return Ok(true);
        }
    }
    log::debug!("Process {name} is NOT running.");
    Ok(false)
}

/// Blocks until any of the signals the service shuts down on arrives.
async fn wait_for_exit_signal() {
    let mut hangup = signal(SignalKind::hangup()).unwrap();
    let mut terminate = signal(SignalKind::terminate()).unwrap();
    let mut quit = signal(SignalKind::quit()).unwrap();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => (),
        _ = hangup.recv() => (),
        _ = terminate.recv() => (),
        _ = quit.recv() => (),
    }
}
