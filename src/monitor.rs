use crate::config::MonitorPaths;
use crate::error::{LidmonError, Result};
use crate::lid::{read_lid_state, LidState};
use crate::lock;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// How often the lid state file is polled.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Sleep after a failed read before retrying.
pub const ERROR_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// The running monitor loop's context: the shutdown flag set by signal
/// handlers and the lid state seen on the previous poll.
pub struct MonitorSession {
    shutdown: Arc<AtomicBool>,
    last_state: Option<LidState>,
}

impl MonitorSession {
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self {
            shutdown,
            last_state: None,
        }
    }

    pub fn last_state(&self) -> Option<LidState> {
        self.last_state
    }

    /// Poll the lid state until the shutdown flag is set, locking the
    /// screen on every open -> closed transition.
    pub fn run(&mut self, paths: &MonitorPaths) -> Result<()> {
        self.run_with(paths, lock::trigger_lock)
    }

    pub(crate) fn run_with<F>(&mut self, paths: &MonitorPaths, mut trigger_lock: F) -> Result<()>
    where
        F: FnMut() -> bool,
    {
        // Fatal only at startup: without a lid device there is nothing to
        // monitor and no PID file must be written.
        if !paths.lid_state.exists() {
            error!(
                "lid state file not found at {} - this may not be a laptop or ACPI is not available",
                paths.lid_state.display()
            );
            return Err(LidmonError::LidStateNotFound(paths.lid_state.clone()));
        }

        info!("starting lid monitoring");

        while !self.shutdown.load(Ordering::SeqCst) {
            match read_lid_state(&paths.lid_state) {
                Ok(current) => {
                    if let Some(last) = self.last_state {
                        if last != current {
                            info!("lid state changed: {} -> {}", last, current);
                            match current {
                                LidState::Closed => {
                                    if !trigger_lock() {
                                        warn!(
                                            "failed to trigger lock - system may be unprotected!"
                                        );
                                    }
                                }
                                LidState::Open => info!("lid opened"),
                                LidState::Unknown => {}
                            }
                        }
                    }
                    self.last_state = Some(current);
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    // Transient: the state file can disappear and reappear
                    // around suspend. Retry on a longer interval.
                    warn!("error reading lid state: {}", err);
                    thread::sleep(ERROR_RETRY_INTERVAL);
                }
            }
        }

        info!("received shutdown signal, lid monitoring stopped");

        // The PID file must be gone on every exit path.
        let _ = fs::remove_file(&paths.pid_file);
        Ok(())
    }
}

/// Register SIGTERM and SIGINT to set the shutdown flag. The loop checks
/// the flag once per poll cycle, so the daemon exits after its current
/// sleep.
pub fn register_shutdown_handlers(shutdown: &Arc<AtomicBool>) -> Result<()> {
    flag::register(SIGTERM, Arc::clone(shutdown))?;
    flag::register(SIGINT, Arc::clone(shutdown))?;
    Ok(())
}
