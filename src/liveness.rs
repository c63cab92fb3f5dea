//! Liveness timestamp tracking.
//!
//! # Responsibilities
//! - Store the time of the most recent ping
//! - Answer "how long since the last ping" for the watchdog
//!
//! # Design Decisions
//! - RwLock: many concurrent readers (watchdog ticks), one writer per ping
//! - The window starts at construction time, so the watchdog cannot fire
//!   before a full timeout has elapsed even if no ping ever arrives
//! - Last writer wins between near-simultaneous pings; only the most recent
//!   timestamp matters

use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Thread-safe record of the most recent liveness ping.
///
/// Shared between the ping endpoint (writer) and the watchdog loop (reader).
pub struct LivenessTracker {
    last_ping: RwLock<Instant>,
}

impl LivenessTracker {
    /// Create a tracker whose liveness window starts now.
    pub fn new() -> Self {
        Self {
            last_ping: RwLock::new(Instant::now()),
        }
    }

    /// Record a ping at the current time.
    pub fn record(&self) {
        let mut last = self.last_ping.write().unwrap_or_else(|e| e.into_inner());
        *last = Instant::now();
    }

    /// Duration since the most recent ping.
    pub fn elapsed(&self) -> Duration {
        let last = self.last_ping.read().unwrap_or_else(|e| e.into_inner());
        last.elapsed()
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}
