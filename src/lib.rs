//! lidmon - monitor laptop lid events and lock the screen on close.
//!
//! lidmon polls the ACPI lid state file and triggers a screen lock through
//! an ordered chain of fallback mechanisms when the lid closes. It can run
//! as a PID-file-tracked background daemon with start/stop/status control.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod lid;
pub mod lock;
pub mod monitor;
pub mod notify;

// Re-export
pub use cli::Cli;
pub use config::MonitorPaths;
pub use daemon::{daemon_pid, run_monitor_worker, show_status, start_daemon, stop_daemon};
pub use error::{LidmonError, Result};
pub use lid::{read_lid_state, LidState};
pub use lock::trigger_lock;
pub use monitor::{register_shutdown_handlers, MonitorSession};
