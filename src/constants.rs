use std::time::Duration;

/// Directory scanned for event device nodes
pub const DEV_PATH: &str = "/dev/input";

/// Directory that grabbed device nodes are moved into so other input
/// consumers cannot reopen them
pub const HIDE_PATH: &str = "/dev/input/.hidden";

/// Time to wait between detection attempts for a missing device
pub const DETECT_DELAY: Duration = Duration::from_millis(500);

/// Pause between the buzzes of a multi-part rumble pattern
pub const FF_DELAY: Duration = Duration::from_millis(200);

/// Button map configuration location
pub const CONFIG_PATH: &str = "/etc/chordpad/config.yaml";

/// Launcher script installed by the Chimera app, if present
pub const CHIMERA_LAUNCHER_PATH: &str = "/usr/share/chimera/bin/chimera-web-launcher";
