//! Shutdown coordination for the supervisor.

use std::fmt;
use std::process::ExitStatus;

use tokio::sync::{broadcast, mpsc};

/// Termination signals the supervisor listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    /// SIGINT, usually an interactive Ctrl+C.
    Interrupt,
    /// SIGTERM, the platform's ordinary termination request.
    Terminate,
}

impl fmt::Display for TermSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSignal::Interrupt => write!(f, "SIGINT"),
            TermSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Why the supervisor is going down.
///
/// Drives logging only: teardown runs the same fixed order regardless of
/// which trigger fired first.
#[derive(Debug)]
pub enum ShutdownReason {
    /// An operator-delivered termination signal.
    ExternalSignal(TermSignal),
    /// The supervised child exited on its own, with the status the OS
    /// reported (or the error from waiting on it).
    ChildExited(std::io::Result<ExitStatus>),
    /// No liveness ping arrived within the configured window.
    WatchdogTimeout,
}

/// Create the shutdown-request channel.
///
/// Several producers (signal listener, child-exit waiter, watchdog) each post
/// at most one `ShutdownReason`; exactly one coordinator drains it and acts on
/// the first message. Capacity covers every producer, so `try_send` never
/// drops a first request.
pub fn request_channel() -> (mpsc::Sender<ShutdownReason>, mpsc::Receiver<ShutdownReason>) {
    mpsc::channel(4)
}

/// Cancellation fan-out for long-running tasks.
///
/// Provides a broadcast channel that background loops subscribe to; triggered
/// once by the coordinator when teardown begins.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the cancellation signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger cancellation. No-op for tasks that already exited.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
