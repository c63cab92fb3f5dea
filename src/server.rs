//! HTTP server setup.
//!
//! # Responsibilities
//! - Bind the configured address and serve an Axum router
//! - Support bounded graceful shutdown during teardown
//! - Provide the liveness route that feeds the watchdog
//!
//! # Design Decisions
//! - One server type for both binaries; only the router differs
//! - Drain is bounded: a listener that will not stop is abandoned and the
//!   process exits anyway

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, State};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::liveness::LivenessTracker;

/// Path served by the liveness endpoint.
pub const PING_PATH: &str = "/_/ping";

/// A running HTTP server with a graceful-shutdown handle.
pub struct HttpServer {
    local_addr: SocketAddr,
    drain_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl HttpServer {
    /// Bind `bind_address` and start serving `app` on a background task.
    ///
    /// Bind failure is fatal to the caller; everything after a successful
    /// bind is log-only.
    pub async fn start(bind_address: &str, app: Router) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(bind_address).await?;
        let local_addr = listener.local_addr()?;

        let (drain_tx, drain_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .await
        });

        tracing::info!(address = %local_addr, "HTTP server started");

        Ok(Self {
            local_addr,
            drain_tx,
            task,
        })
    }

    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Drain in-flight requests and stop, bounded by `grace`.
    ///
    /// Exceeding the grace period is a non-fatal condition: the server task
    /// is abandoned in place and reclaimed by process exit.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.drain_tx.send(());

        match tokio::time::timeout(grace, self.task).await {
            Ok(Ok(Ok(()))) => tracing::info!("HTTP server stopped"),
            Ok(Ok(Err(err))) => tracing::warn!(error = %err, "HTTP server exited with error"),
            Ok(Err(err)) => tracing::warn!(error = %err, "HTTP server task failed"),
            Err(_) => tracing::warn!(
                grace_secs = grace.as_secs(),
                "HTTP server did not stop within the grace period, abandoning"
            ),
        }
    }
}

/// Build the liveness router: `GET /_/ping` records a ping and answers
/// `"pong"`. No authentication; calling it is the sole way to reset the
/// liveness window.
pub fn ping_router(tracker: Arc<LivenessTracker>) -> Router {
    Router::new()
        .route(PING_PATH, get(ping_handler))
        .with_state(tracker)
        .layer(TraceLayer::new_for_http())
}

async fn ping_handler(
    State(tracker): State<Arc<LivenessTracker>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
) -> &'static str {
    tracker.record();
    tracing::debug!(remote = %remote, "Received ping request");
    "pong"
}
