//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → first one posted as a shutdown request
//!
//! Shutdown (shutdown.rs):
//!     requests: producers post a ShutdownReason, one coordinator takes the first
//!     cancellation: broadcast fan-out that stops background loops
//! ```
//!
//! # Design Decisions
//! - Watchdog expiry posts the same kind of request an operator signal does:
//!   the coordinator has a single termination entry point
//! - Teardown runs exactly once, on the coordinator task, in a fixed order

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownReason, TermSignal};
