//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate the first signal into a shutdown request
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Listens once: signals arriving during teardown are ignored

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use crate::lifecycle::shutdown::{ShutdownReason, TermSignal};

/// Spawn a task that posts the first SIGINT/SIGTERM as a shutdown request.
///
/// Handlers are registered before this returns, so a signal delivered any
/// time after a successful call is observed. Registration failure is fatal
/// to the caller: a supervisor that cannot hear termination requests would
/// never shut down cleanly.
pub fn listen(requests: mpsc::Sender<ShutdownReason>) -> std::io::Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        let received = tokio::select! {
            _ = interrupt.recv() => TermSignal::Interrupt,
            _ = terminate.recv() => TermSignal::Terminate,
        };
        let _ = requests.try_send(ShutdownReason::ExternalSignal(received));
    });

    Ok(())
}
