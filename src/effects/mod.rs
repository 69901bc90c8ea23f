//! Handlers for chord actions that do something other than press keys:
//! launching apps, toggling the TDP profile, brightness and power
//! management. Each handler deals with its own failures so a broken
//! system command can never take down the chord engine.

pub mod brightness;

use std::error::Error;
use std::path::Path;

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use crate::constants::{CHIMERA_LAUNCHER_PATH, FF_DELAY};
use crate::input::session::EffectRunner;
use crate::input::source::gamepad::{FFCommand, RumbleRequest};
use crate::profile::{PowerAction, SideEffect};

/// The desktop session owner, used to run apps outside the daemon's
/// root context and to find their dotfiles.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub name: String,
    pub home: String,
}

/// Wait for a user to log in and return the one logged in the longest.
/// The daemon starts before the display manager, so this can take a
/// while on boot.
pub async fn discover_user() -> SessionUser {
    log::debug!("Identifying user.");
    loop {
        match logged_in_user().await {
            Ok(Some(name)) => {
                let home = format!("/home/{name}");
                log::debug!("Found session user {name} with home {home}");
                return SessionUser { name, home };
            }
            Ok(None) => (),
            Err(e) => log::debug!("Failed to list logged in users: {e:?}"),
        }
        sleep(Duration::from_secs(1)).await;
    }
}

async fn logged_in_user() -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
    let output = Command::new("who").output().await?;
    let listing = String::from_utf8_lossy(&output.stdout);
    let mut names: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    names.sort_unstable();
    Ok(names.first().map(|name| name.to_string()))
}

/// TDP profile passed to ryzenadj
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PerformanceMode {
    PowerSaving,
    MaxPerformance,
}

impl PerformanceMode {
    fn flag(&self) -> &'static str {
        match self {
            PerformanceMode::PowerSaving => "--power-saving",
            PerformanceMode::MaxPerformance => "--max-performance",
        }
    }
}

/// Runs side effect actions for the session. Slow handlers are spawned
/// onto the runtime so chord processing never waits on a subprocess.
pub struct Dispatcher {
    user: SessionUser,
    performance_mode: PerformanceMode,
    has_chimera_launcher: bool,
    controller_tx: mpsc::Sender<FFCommand>,
}

impl Dispatcher {
    pub fn new(user: SessionUser, controller_tx: mpsc::Sender<FFCommand>) -> Self {
        let has_chimera_launcher = Path::new(CHIMERA_LAUNCHER_PATH).is_file();
        Self {
            user,
            performance_mode: PerformanceMode::PowerSaving,
            has_chimera_launcher,
            controller_tx,
        }
    }
}

impl EffectRunner for Dispatcher {
    fn run_effect(&mut self, effect: SideEffect) {
        match effect {
            SideEffect::OpenKeyboard => {
                let user = self.user.clone();
                tokio::spawn(async move {
                    if let Err(e) = steam_ifrunning_deckui(&user, "steam://open/keyboard").await {
                        log::error!("Failed to open the Steam keyboard: {e:?}");
                    }
                });
            }
            SideEffect::OpenChimera => {
                log::debug!("Open Chimera");
                if !self.has_chimera_launcher {
                    return;
                }
                let user = self.user.clone();
                tokio::spawn(async move {
                    let result = Command::new("su")
                        .args([user.name.as_str(), "-c", CHIMERA_LAUNCHER_PATH])
                        .status()
                        .await;
                    if let Err(e) = result {
                        log::error!("Failed to launch the Chimera app: {e:?}");
                    }
                });
            }
            SideEffect::TogglePerformance => {
                log::debug!("Toggle Performance");
                self.performance_mode = match self.performance_mode {
                    PerformanceMode::MaxPerformance => PerformanceMode::PowerSaving,
                    PerformanceMode::PowerSaving => PerformanceMode::MaxPerformance,
                };
                let mode = self.performance_mode;
                let controller_tx = self.controller_tx.clone();
                tokio::spawn(async move {
                    apply_performance_mode(mode, controller_tx).await;
                });
            }
            SideEffect::ToggleMouse => {
                log::debug!("Mouse mode toggling is not currently enabled");
            }
            SideEffect::ToggleGyro => {
                log::debug!("Gyro toggling is not currently enabled");
            }
            SideEffect::BrightnessUp => {
                if let Err(e) = brightness::increase() {
                    log::error!("Failed to raise display brightness: {e:?}");
                }
            }
            SideEffect::BrightnessDown => {
                if let Err(e) = brightness::decrease() {
                    log::error!("Failed to lower display brightness: {e:?}");
                }
            }
        }
    }

    fn run_power_action(&mut self, action: PowerAction) {
        let command = match action {
            PowerAction::Suspend => "suspend",
            PowerAction::Hibernate => "hibernate",
            PowerAction::Shutdown => "poweroff",
        };
        log::debug!("Power Action: {command}");
        tokio::spawn(async move {
            if let Err(e) = Command::new("systemctl").arg(command).status().await {
                log::error!("Failed to run systemctl {command}: {e:?}");
            }
        });
    }

    fn rumble(&mut self, request: RumbleRequest) {
        if self.controller_tx.try_send(FFCommand::Rumble(request)).is_err() {
            log::warn!("Controller is not ready. Dropping rumble request.");
        }
    }
}

/// Play the feedback pattern for the new mode, then hand it to ryzenadj.
/// Power saving answers with one short and one medium buzz, max
/// performance with one long and two short.
async fn apply_performance_mode(mode: PerformanceMode, controller_tx: mpsc::Sender<FFCommand>) {
    match mode {
        PerformanceMode::PowerSaving => {
            rumble(&controller_tx, 10).await;
            sleep(FF_DELAY).await;
            rumble(&controller_tx, 100).await;
        }
        PerformanceMode::MaxPerformance => {
            rumble(&controller_tx, 500).await;
            sleep(FF_DELAY).await;
            rumble(&controller_tx, 75).await;
            sleep(FF_DELAY).await;
            rumble(&controller_tx, 75).await;
        }
    }

    match Command::new("ryzenadj").arg(mode.flag()).output().await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            log::debug!("{}", stdout.trim());
        }
        Err(e) => log::error!("Failed to run ryzenadj: {e:?}"),
    }
}

/// Queue one feedback pulse and wait out its play time so back to back
/// pulses stay distinct.
async fn rumble(controller_tx: &mpsc::Sender<FFCommand>, interval: u16) {
    let request = RumbleRequest {
        interval,
        ..Default::default()
    };
    if controller_tx.send(FFCommand::Rumble(request)).await.is_err() {
        log::warn!("Controller is gone. Dropping rumble request.");
        return;
    }
    sleep(Duration::from_millis(interval.into())).await;
}

/// Send a command to Steam if it is running in gamepad UI mode. Desktop
/// mode Steam ignores overlay commands, so it is skipped entirely.
async fn steam_ifrunning_deckui(
    user: &SessionUser,
    command: &str,
) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let pid_path = format!("{}/.steam/steam.pid", user.home);
    let pid = tokio::fs::read_to_string(&pid_path).await?.trim().to_string();

    // Steam is not running if the recorded pid is stale
    let cmdline = match tokio::fs::read(format!("/proc/{pid}/cmdline")).await {
        Ok(cmdline) => cmdline,
        Err(_) => return Ok(false),
    };
    let needle = b"-gamepadui";
    let is_deckui = cmdline.windows(needle.len()).any(|window| window == needle);
    if !is_deckui {
        return Ok(false);
    }

    let steam = format!("{}/.steam/root/ubuntu12_32/steam", user.home);
    let status = Command::new("su")
        .args([user.name.as_str(), "-c", &format!("{steam} -ifrunning {command}")])
        .status()
        .await?;
    Ok(status.success())
}
