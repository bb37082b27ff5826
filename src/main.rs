use clap::Parser;
use lidmon::{Cli, LidmonError, MonitorPaths, MonitorSession};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let paths = MonitorPaths::system();

    // Hidden worker mode: we are the spawned daemon process
    if cli.monitor_worker {
        if let Err(e) = lidmon::run_monitor_worker(&paths) {
            eprintln!("Daemon worker failed: {}", e);
            process::exit(exit_code(&e));
        }
        return;
    }

    let result = if cli.daemon {
        lidmon::start_daemon(&paths, cli.notify)
    } else if cli.stop {
        lidmon::stop_daemon(&paths, cli.notify)
    } else if cli.status {
        lidmon::show_status(&paths)
    } else {
        run_foreground(&paths)
    };

    if let Err(e) = result {
        match &e {
            LidmonError::DaemonAlreadyRunning(pid) => {
                println!("Lid monitor daemon is already running (PID: {})", pid);
            }
            _ => eprintln!("Error: {}", e),
        }
        process::exit(exit_code(&e));
    }
}

/// Foreground monitoring, the default action. No PID file is written;
/// Ctrl+C stops the loop.
fn run_foreground(paths: &MonitorPaths) -> lidmon::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    lidmon::register_shutdown_handlers(&shutdown)?;
    MonitorSession::new(shutdown).run(paths)
}

/// The original tool exited 0 on every path. "Not a laptop" and "already
/// running" now get distinct codes so launchers can branch on them.
fn exit_code(err: &LidmonError) -> i32 {
    match err {
        LidmonError::LidStateNotFound(_) => 2,
        LidmonError::DaemonAlreadyRunning(_) => 3,
        _ => 1,
    }
}
