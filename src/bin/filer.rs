//! filer: basic-auth HTTP file server with idle self-shutdown.
//!
//! Serves the configured directory (download, JSON listing, multipart
//! upload, delete) behind a single basic-auth credential pair. Every
//! authenticated request resets an inactivity window; when the window
//! expires the server drains in-flight requests and exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pingguard::config::{FilerConfig, WatchdogConfig};
use pingguard::filer::{self, FilerState};
use pingguard::lifecycle::shutdown::{self, Shutdown, ShutdownReason};
use pingguard::lifecycle::signals;
use pingguard::liveness::LivenessTracker;
use pingguard::server::HttpServer;
use pingguard::watchdog::Watchdog;

#[derive(Parser)]
#[command(name = "filer")]
#[command(about = "Serve a directory over basic-auth HTTP until it goes idle", long_about = None)]
struct Cli {
    /// Bind address (host:port).
    #[arg(long, default_value = "0.0.0.0:8100")]
    bind: String,

    /// Directory of files to host.
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Upper bound on upload bodies, in bytes.
    #[arg(long, default_value_t = 32 << 16)]
    buffsize: usize,

    /// Idle timeout in seconds before the server shuts itself down.
    #[arg(long, default_value_t = 3600)]
    duration: u64,

    /// Grace period in seconds for draining requests at shutdown.
    #[arg(long, default_value_t = 1200)]
    waittime: u64,

    /// Basic auth username.
    #[arg(long, default_value = "filer")]
    username: String,

    /// Basic auth password.
    #[arg(long, default_value = "filer")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pingguard=info,filer=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = FilerConfig {
        bind_address: cli.bind,
        root: cli.path,
        username: cli.username,
        password: cli.password,
        upload_limit: cli.buffsize,
        idle_timeout: Duration::from_secs(cli.duration),
        drain_timeout: Duration::from_secs(cli.waittime),
    };

    tracing::info!(
        bind_address = %config.bind_address,
        root = %config.root.display(),
        idle_secs = config.idle_timeout.as_secs(),
        "filer starting"
    );

    run(config).await?;
    Ok(())
}

/// Serve until the idle watchdog or a termination signal fires, then drain.
async fn run(config: FilerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = Arc::new(LivenessTracker::new());
    let (requests_tx, mut requests_rx) = shutdown::request_channel();
    let cancel = Shutdown::new();

    let state = Arc::new(FilerState::new(&config, tracker.clone()));
    let server = HttpServer::start(
        &config.bind_address,
        filer::router(state, config.upload_limit),
    )
    .await?;

    signals::listen(requests_tx.clone())?;

    let watchdog = Watchdog::new(tracker, WatchdogConfig::new(config.idle_timeout));
    tokio::spawn(watchdog.run(cancel.subscribe(), requests_tx));

    if let Some(reason) = requests_rx.recv().await {
        log_reason(&reason, &config);
    }

    cancel.trigger();
    server.shutdown(config.drain_timeout).await;

    tracing::info!("Server exiting now");
    Ok(())
}

fn log_reason(reason: &ShutdownReason, config: &FilerConfig) {
    match reason {
        ShutdownReason::WatchdogTimeout => {
            tracing::info!(
                idle_secs = config.idle_timeout.as_secs(),
                "No requests within the idle window, shutting down after requests finish"
            );
        }
        ShutdownReason::ExternalSignal(sig) => {
            tracing::info!(signal = %sig, "Received termination signal, shutting down");
        }
        // No child process in the filer; nothing else can post.
        ShutdownReason::ChildExited(_) => {}
    }
}
