//! Supervisor wiring and shutdown coordination.
//!
//! # Data Flow
//! ```text
//! signal listener ─┐
//! child-exit waiter┼─▶ shutdown requests (first wins) ─▶ teardown:
//! watchdog loop   ─┘       cancel watchdog → terminate child → drain endpoint
//! ```
//!
//! # Design Decisions
//! - Ordered startup: tracker and channels, listener bind, child spawn,
//!   background tasks; any startup error is fatal
//! - Teardown order is identical for every trigger; the reason drives
//!   logging only
//! - Each teardown step is best-effort: a failed step never blocks the next

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::SupervisorConfig;
use crate::lifecycle::shutdown::{self, Shutdown, ShutdownReason};
use crate::lifecycle::signals;
use crate::liveness::LivenessTracker;
use crate::process::{self, SpawnError};
use crate::server::{self, HttpServer};
use crate::watchdog::Watchdog;

/// Grace period for draining the ping endpoint during teardown.
const ENDPOINT_GRACE: Duration = Duration::from_secs(5);

/// Fatal startup failures. Anything after startup is log-only; the process
/// exit code is the sole structured surface.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to bind ping server on {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error("failed to install signal handlers: {0}")]
    Signals(std::io::Error),
}

/// Run the supervisor until the first shutdown trigger, then tear down.
///
/// Returns `Ok(())` on every orderly shutdown path (signal, child exit,
/// watchdog timeout); errors only on fatal startup failure.
pub async fn run(config: SupervisorConfig) -> Result<(), SupervisorError> {
    let tracker = Arc::new(LivenessTracker::new());
    let (requests_tx, mut requests_rx) = shutdown::request_channel();
    let cancel = Shutdown::new();

    let server = HttpServer::start(&config.bind_address, server::ping_router(tracker.clone()))
        .await
        .map_err(|source| SupervisorError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

    // A failed spawn exits without draining the listener; process exit
    // reclaims the socket.
    let child = process::spawn(&config.command, requests_tx.clone())?;

    signals::listen(requests_tx.clone()).map_err(SupervisorError::Signals)?;

    tokio::spawn(
        Watchdog::new(tracker, config.watchdog).run(cancel.subscribe(), requests_tx),
    );

    // Block until the first of {signal, child exit, watchdog timeout}.
    if let Some(reason) = requests_rx.recv().await {
        log_reason(&reason);
    }

    // Fixed-order teardown, exactly once, best-effort per step.
    cancel.trigger();

    if !child.has_exited() {
        process::terminate(&child);
    }

    server.shutdown(ENDPOINT_GRACE).await;

    tracing::info!("Supervisor exited");
    Ok(())
}

fn log_reason(reason: &ShutdownReason) {
    match reason {
        ShutdownReason::ExternalSignal(sig) => {
            tracing::info!(signal = %sig, "Received termination signal, exiting");
        }
        ShutdownReason::ChildExited(Ok(status)) if status.success() => {
            tracing::info!("Supervised process exited normally");
        }
        ShutdownReason::ChildExited(Ok(status)) => {
            // An unhappy child is not a supervisor failure.
            tracing::warn!(status = %status, "Supervised process exited with error");
        }
        ShutdownReason::ChildExited(Err(err)) => {
            tracing::warn!(error = %err, "Failed waiting on supervised process");
        }
        ShutdownReason::WatchdogTimeout => {
            tracing::info!("Watchdog timeout, exiting");
        }
    }
}
