//! Ping-driven process supervision and file serving.
//!
//! Two binaries share this library:
//! - `pingguard` wraps an arbitrary program with a liveness watchdog: a
//!   `GET /_/ping` endpoint resets the window, and the supervisor takes the
//!   program down with it when the window expires
//! - `filer` serves files over basic-auth HTTP until it goes idle

pub mod config;
pub mod filer;
pub mod lifecycle;
pub mod liveness;
pub mod process;
pub mod server;
pub mod supervisor;
pub mod watchdog;

pub use config::{FilerConfig, SupervisorConfig, WatchdogConfig};
pub use lifecycle::{Shutdown, ShutdownReason};
pub use liveness::LivenessTracker;
pub use server::HttpServer;
