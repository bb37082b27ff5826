use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LidmonError {
    /// The ACPI lid state file is missing. Not a laptop, or ACPI is
    /// unavailable on this machine.
    #[error("lid state file not found at {0} - this may not be a laptop or ACPI is not available")]
    LidStateNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid PID in daemon file: {0:?}")]
    InvalidPid(String),

    #[error("daemon already running with PID {0}")]
    DaemonAlreadyRunning(u32),

    #[error("no lid monitor daemon found")]
    DaemonNotRunning,

    #[error("process {0} no longer exists")]
    ProcessNotFound(u32),

    #[error("permission denied signalling process {0}")]
    PermissionDenied(u32),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LidmonError>;
