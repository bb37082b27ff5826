use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One external command capable of locking the session.
pub struct LockMechanism {
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub timeout: Duration,
}

/// The fallback chain, ordered from most specific to most universal.
/// The order and commands are fixed policy; only the invocation primitive
/// may change.
pub const LOCK_MECHANISMS: [LockMechanism; 5] = [
    LockMechanism {
        name: "hyprctl global dispatch",
        program: "hyprctl",
        args: &["dispatch", "global", "caelestia:lock"],
        timeout: Duration::from_secs(5),
    },
    LockMechanism {
        name: "caelestia shell",
        program: "caelestia",
        args: &["shell", "caelestia:lock"],
        timeout: Duration::from_secs(5),
    },
    LockMechanism {
        name: "hyprctl exec dispatch",
        program: "hyprctl",
        args: &["dispatch", "exec", "caelestia shell caelestia:lock"],
        timeout: Duration::from_secs(5),
    },
    LockMechanism {
        name: "loginctl session lock",
        program: "loginctl",
        args: &["lock-session"],
        timeout: Duration::from_secs(5),
    },
    LockMechanism {
        name: "swaylock",
        program: "swaylock",
        args: &[],
        timeout: Duration::from_secs(2),
    },
];

/// Outcome of a single lock mechanism attempt.
#[derive(Debug)]
pub enum LockAttempt {
    Succeeded,
    Failed(String),
    Unavailable(String),
}

/// Try each lock mechanism in order until one reports success.
///
/// Returns false only when every mechanism has been attempted and none
/// succeeded. Individual failures are logged, never escalated.
pub fn trigger_lock() -> bool {
    trigger_lock_with(run_mechanism)
}

pub(crate) fn trigger_lock_with<F>(mut run: F) -> bool
where
    F: FnMut(&LockMechanism) -> LockAttempt,
{
    info!("lid closed - triggering lock");

    for mechanism in &LOCK_MECHANISMS {
        info!("trying {}", mechanism.name);
        match run(mechanism) {
            LockAttempt::Succeeded => {
                info!("lock triggered successfully via {}", mechanism.name);
                return true;
            }
            LockAttempt::Failed(reason) => {
                warn!("{} failed: {}", mechanism.name, reason);
            }
            LockAttempt::Unavailable(reason) => {
                warn!("{} not available: {}", mechanism.name, reason);
            }
        }
    }

    warn!("all lock methods failed - system may be unprotected!");
    false
}

/// Run a mechanism's command, bounded by its timeout.
fn run_mechanism(mechanism: &LockMechanism) -> LockAttempt {
    let mut child = match Command::new(mechanism.program)
        .args(mechanism.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return LockAttempt::Unavailable(format!("{} not found", mechanism.program));
        }
        Err(err) => return LockAttempt::Failed(err.to_string()),
    };

    let deadline = Instant::now() + mechanism.timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if status.success() {
                    return LockAttempt::Succeeded;
                }
                let mut stderr = String::new();
                if let Some(ref mut pipe) = child.stderr {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                return LockAttempt::Failed(format!(
                    "exited with {}: {}",
                    status,
                    stderr.trim()
                ));
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return LockAttempt::Unavailable(format!(
                        "timed out after {:?}",
                        mechanism.timeout
                    ));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(err) => return LockAttempt::Failed(err.to_string()),
        }
    }
}
