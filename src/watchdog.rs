//! Liveness watchdog.
//!
//! # Responsibilities
//! - Periodically compare time-since-last-ping against the timeout
//! - Request supervisor shutdown when the window expires
//!
//! # Design Decisions
//! - Poll period is a third of the timeout, so detection lags the deadline by
//!   at most one check interval
//! - Cancellation exits the loop without posting: once teardown has begun via
//!   another path, a late expiry must not race it

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::config::WatchdogConfig;
use crate::lifecycle::shutdown::ShutdownReason;
use crate::liveness::LivenessTracker;

/// Periodic liveness checker.
///
/// Runs until the liveness window expires (posting a shutdown request) or
/// until cancelled by the coordinator.
pub struct Watchdog {
    tracker: Arc<LivenessTracker>,
    config: WatchdogConfig,
}

impl Watchdog {
    pub fn new(tracker: Arc<LivenessTracker>, config: WatchdogConfig) -> Self {
        Self { tracker, config }
    }

    /// Run the check loop.
    ///
    /// None of the operations here can fail; the only "failure" this loop
    /// knows is the absence of pings, which is the condition it exists to
    /// detect.
    pub async fn run(
        self,
        mut shutdown: broadcast::Receiver<()>,
        requests: mpsc::Sender<ShutdownReason>,
    ) {
        tracing::info!(
            timeout_secs = self.config.timeout.as_secs_f64(),
            "Watchdog starting"
        );

        let mut ticker = time::interval(self.config.check_interval());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let idle = self.tracker.elapsed();
                    if idle > self.config.timeout {
                        tracing::warn!(
                            idle_secs = idle.as_secs_f64(),
                            timeout_secs = self.config.timeout.as_secs_f64(),
                            "No ping received within the timeout window, requesting shutdown"
                        );
                        let _ = requests.try_send(ShutdownReason::WatchdogTimeout);
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Watchdog received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
