use std::env;
use std::path::PathBuf;

/// ACPI lid switch state file on Linux laptops.
pub const LID_STATE_PATH: &str = "/proc/acpi/button/lid/LID/state";

pub const PID_FILENAME: &str = "lidmon.pid";
pub const LOG_FILENAME: &str = "lidmon.log";

/// Get the runtime directory for the PID file and daemon log
pub fn runtime_dir() -> PathBuf {
    env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Paths the monitor operates on. Bundled so tests can point both the
/// lid state file and the PID file at a temporary directory.
#[derive(Debug, Clone)]
pub struct MonitorPaths {
    pub lid_state: PathBuf,
    pub pid_file: PathBuf,
}

impl MonitorPaths {
    /// The real system paths used outside of tests.
    pub fn system() -> Self {
        Self {
            lid_state: PathBuf::from(LID_STATE_PATH),
            pid_file: runtime_dir().join(PID_FILENAME),
        }
    }
}

/// Get the path the daemon worker redirects its output to
pub fn daemon_log_path() -> PathBuf {
    runtime_dir().join(LOG_FILENAME)
}
