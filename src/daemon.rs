use crate::config::{daemon_log_path, MonitorPaths};
use crate::error::{LidmonError, Result};
use crate::lid::read_lid_state;
use crate::monitor::{register_shutdown_handlers, MonitorSession};
use crate::notify::notify;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::env;
use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Graceful stop: how many times the controller probes for process death.
const STOP_ATTEMPTS: u32 = 10;
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Start: how long the controller waits for the worker's PID file.
const START_ATTEMPTS: u32 = 20;
const START_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Probe a process with the null signal. EPERM means the process exists
/// but belongs to someone else, so it still counts as alive.
fn process_alive(pid: u32) -> Result<bool> {
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(Errno::EPERM) => Ok(true),
        Err(err) => Err(LidmonError::Other(format!(
            "failed to probe process {}: {}",
            pid, err
        ))),
    }
}

/// Singleton check: the PID of the running daemon, if any.
///
/// A PID file with unparseable content or a dead process is stale; it is
/// deleted as a side effect and the daemon reported as not running.
pub fn daemon_pid(pid_file: &Path) -> Result<Option<u32>> {
    if !pid_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(pid_file)?;
    let pid = match content.trim().parse::<u32>() {
        Ok(pid) => pid,
        Err(_) => {
            let _ = fs::remove_file(pid_file);
            return Ok(None);
        }
    };

    if process_alive(pid)? {
        Ok(Some(pid))
    } else {
        let _ = fs::remove_file(pid_file);
        Ok(None)
    }
}

/// Start the lid monitor as a background daemon.
///
/// Spawns the current executable in worker mode with its output redirected,
/// then waits briefly for the worker to write its PID file and reports the
/// PID. Coordination with other controllers is through the PID file's
/// existence only; a racing start fails soft.
pub fn start_daemon(paths: &MonitorPaths, send_notifications: bool) -> Result<()> {
    if let Some(pid) = daemon_pid(&paths.pid_file)? {
        return Err(LidmonError::DaemonAlreadyRunning(pid));
    }

    let current_exe = env::current_exe()?;
    let log_path = daemon_log_path();
    let stdout = File::create(&log_path)?;
    let stderr = stdout.try_clone()?;

    Command::new(current_exe)
        .arg("--monitor-worker")
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn()?;

    for _ in 0..START_ATTEMPTS {
        thread::sleep(START_POLL_INTERVAL);
        if let Some(pid) = daemon_pid(&paths.pid_file)? {
            println!("Lid monitor started as daemon (PID: {})", pid);
            if send_notifications {
                notify("Lid Monitor", "Automatic lid locking enabled", "security-high");
            }
            return Ok(());
        }
    }

    let msg = format!(
        "daemon failed to start, check log at {}",
        log_path.display()
    );
    if send_notifications {
        notify("Lid Monitor Error", &msg, "dialog-error");
    }
    Err(LidmonError::Other(msg))
}

/// Entry point of the spawned worker process: detach into an own session,
/// write the PID file and run the monitor loop until shutdown.
pub fn run_monitor_worker(paths: &MonitorPaths) -> Result<()> {
    // Without a lid device there is nothing to monitor; exit before
    // writing a PID file.
    if !paths.lid_state.exists() {
        return Err(LidmonError::LidStateNotFound(paths.lid_state.clone()));
    }

    detach_session();
    fs::write(&paths.pid_file, std::process::id().to_string())?;

    let shutdown = Arc::new(AtomicBool::new(false));
    register_shutdown_handlers(&shutdown)?;

    // The loop removes the PID file on every exit path.
    MonitorSession::new(shutdown).run(paths)
}

/// Detach from the controller's session so the worker survives its
/// terminal: new session id, root working directory, cleared umask.
fn detach_session() {
    if let Err(err) = nix::unistd::setsid() {
        warn!("failed to create new session: {}", err);
    }
    let _ = env::set_current_dir("/");
    nix::sys::stat::umask(nix::sys::stat::Mode::empty());
}

/// Stop the running daemon: SIGTERM, bounded wait for death, SIGKILL as a
/// last resort. The PID file is deleted regardless of outcome.
pub fn stop_daemon(paths: &MonitorPaths, send_notifications: bool) -> Result<()> {
    let pid_file = &paths.pid_file;
    if !pid_file.exists() {
        println!("No lid monitor daemon found");
        return Ok(());
    }

    let content = fs::read_to_string(pid_file)?;
    let outcome = match content.trim().parse::<u32>() {
        Ok(pid) => terminate(pid),
        Err(_) => Err(LidmonError::InvalidPid(content.trim().to_string())),
    };

    // Never leave a stale record behind, whatever happened above.
    let _ = fs::remove_file(pid_file);

    match outcome {
        Ok(())
        | Err(LidmonError::ProcessNotFound(_))
        | Err(LidmonError::PermissionDenied(_))
        | Err(LidmonError::InvalidPid(_)) => {
            println!("Lid monitor daemon stopped");
            if send_notifications {
                notify("Lid Monitor", "Automatic lid locking disabled", "security-low");
            }
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn terminate(pid: u32) -> Result<()> {
    let target = Pid::from_raw(pid as i32);

    match kill(target, Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return Err(LidmonError::ProcessNotFound(pid)),
        Err(Errno::EPERM) => return Err(LidmonError::PermissionDenied(pid)),
        Err(err) => {
            return Err(LidmonError::Other(format!(
                "failed to signal process {}: {}",
                pid, err
            )))
        }
    }

    for _ in 0..STOP_ATTEMPTS {
        if !process_alive(pid)? {
            return Ok(());
        }
        thread::sleep(STOP_POLL_INTERVAL);
    }

    // Graceful shutdown did not land in time; force it.
    match kill(target, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(Errno::EPERM) => Err(LidmonError::PermissionDenied(pid)),
        Err(err) => Err(LidmonError::Other(format!(
            "failed to kill process {}: {}",
            pid, err
        ))),
    }
}

/// Report daemon and lid state.
pub fn show_status(paths: &MonitorPaths) -> Result<()> {
    match daemon_pid(&paths.pid_file)? {
        Some(pid) => {
            println!("Lid monitor daemon: RUNNING (PID: {})", pid);
            println!("Automatic locking: ENABLED");
        }
        None => {
            println!("Lid monitor daemon: STOPPED");
            println!("Automatic locking: DISABLED");
        }
    }

    match read_lid_state(&paths.lid_state) {
        Ok(state) => println!("Current lid state: {}", state),
        Err(err) => println!("Could not read lid state: {}", err),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Valid as an i32 but far above any kernel pid_max, so the probe
    // always reports it dead.
    const DEAD_PID: &str = "999999999";

    fn test_paths(dir: &std::path::Path) -> MonitorPaths {
        MonitorPaths {
            lid_state: dir.join("state"),
            pid_file: dir.join("lidmon.pid"),
        }
    }

    #[test]
    fn daemon_pid_without_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(daemon_pid(&dir.path().join("lidmon.pid"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn daemon_pid_with_live_process() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("lidmon.pid");
        fs::write(&pid_file, std::process::id().to_string()).unwrap();
        assert_eq!(daemon_pid(&pid_file).unwrap(), Some(std::process::id()));
        assert!(pid_file.exists());
    }

    #[test]
    fn stale_pid_file_is_deleted() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("lidmon.pid");
        fs::write(&pid_file, DEAD_PID).unwrap();
        assert!(daemon_pid(&pid_file).unwrap().is_none());
        assert!(!pid_file.exists());
    }

    #[test]
    fn unparseable_pid_file_is_deleted() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("lidmon.pid");
        fs::write(&pid_file, "not-a-pid").unwrap();
        assert!(daemon_pid(&pid_file).unwrap().is_none());
        assert!(!pid_file.exists());
    }

    #[test]
    fn stop_without_pid_file_is_a_noop() {
        let dir = tempdir().unwrap();
        let paths = test_paths(dir.path());
        stop_daemon(&paths, false).unwrap();
        assert!(!paths.pid_file.exists());
    }

    #[test]
    fn stop_with_stale_pid_cleans_up() {
        let dir = tempdir().unwrap();
        let paths = test_paths(dir.path());
        fs::write(&paths.pid_file, DEAD_PID).unwrap();
        stop_daemon(&paths, false).unwrap();
        assert!(!paths.pid_file.exists());
    }

    #[test]
    fn stop_with_garbage_pid_cleans_up() {
        let dir = tempdir().unwrap();
        let paths = test_paths(dir.path());
        fs::write(&paths.pid_file, "garbage").unwrap();
        stop_daemon(&paths, false).unwrap();
        assert!(!paths.pid_file.exists());
    }

    #[test]
    fn start_with_live_pid_file_leaves_it_untouched() {
        let dir = tempdir().unwrap();
        let paths = test_paths(dir.path());
        fs::write(&paths.pid_file, std::process::id().to_string()).unwrap();

        match start_daemon(&paths, false) {
            Err(LidmonError::DaemonAlreadyRunning(pid)) => {
                assert_eq!(pid, std::process::id());
            }
            other => panic!("expected DaemonAlreadyRunning, got {:?}", other),
        }
        assert!(paths.pid_file.exists());
    }
}
