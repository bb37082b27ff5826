use clap::Parser;

#[derive(Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "lidmon - monitor laptop lid events and lock the screen when the lid closes",
)]
pub struct Cli {
    #[clap(long, short, help = "Start the lid monitor as a background daemon")]
    pub daemon: bool,

    #[clap(long, short, help = "Stop the lid monitor daemon")]
    pub stop: bool,

    #[clap(long, help = "Show daemon status and current lid state")]
    pub status: bool,

    #[clap(
        long,
        short,
        help = "Monitor in the foreground (default when no flag is given)"
    )]
    pub monitor: bool,

    #[clap(long, short, help = "Send desktop notifications on daemon start/stop")]
    pub notify: bool,

    // Internal entry flag for the spawned daemon worker process
    #[clap(long, hide = true)]
    pub monitor_worker: bool,
}
