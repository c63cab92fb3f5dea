//! pingguard: start any program with ping health check functionality.
//!
//! ```text
//! pingguard --interval 60 --bind 127.0.0.1:8081 -- python -m http.server 8000
//! ```
//!
//! The wrapped program runs with its standard streams passed through. Each
//! `GET /_/ping` on the bind address resets the liveness window; if no ping
//! arrives for `--interval` seconds, the supervisor assumes the environment
//! has abandoned it and exits, terminating the program.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pingguard::config::{SupervisorConfig, WatchdogConfig};
use pingguard::supervisor;

#[derive(Parser)]
#[command(name = "pingguard")]
#[command(about = "Start any program with ping health check functionality", long_about = None)]
struct Cli {
    /// Ping service bind address (host:port).
    #[arg(long, default_value = "127.0.0.1:8081")]
    bind: String,

    /// Ping timeout in seconds; the program exits if no ping requests are
    /// received within this window.
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// Program to supervise, with its arguments (after --).
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pingguard=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = SupervisorConfig {
        bind_address: cli.bind,
        watchdog: WatchdogConfig::new(Duration::from_secs(cli.interval)),
        command: cli.command,
    };

    tracing::info!(
        bind_address = %config.bind_address,
        interval_secs = config.watchdog.timeout.as_secs(),
        "pingguard starting"
    );

    supervisor::run(config).await?;
    Ok(())
}
