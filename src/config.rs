//! Configuration schema definitions.
//!
//! All settings come from the command line; each binary parses its flags and
//! builds the matching config struct here. Created once at startup, never
//! mutated afterwards.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the `pingguard` supervisor binary.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Ping endpoint bind address (e.g. "127.0.0.1:8081").
    pub bind_address: String,

    /// Watchdog timing.
    pub watchdog: WatchdogConfig,

    /// Program to supervise, with its arguments.
    pub command: Vec<String>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8081".to_string(),
            watchdog: WatchdogConfig::default(),
            command: Vec::new(),
        }
    }
}

/// Watchdog timing configuration.
#[derive(Debug, Clone, Copy)]
pub struct WatchdogConfig {
    /// Window after which an unpinged supervisor shuts itself down.
    pub timeout: Duration,
}

impl WatchdogConfig {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Poll period for liveness checks.
    ///
    /// Oversampling the timeout by 3 bounds worst-case detection latency to
    /// a third of the window.
    pub fn check_interval(&self) -> Duration {
        self.timeout / 3
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

/// Configuration for the `filer` file server binary.
#[derive(Debug, Clone)]
pub struct FilerConfig {
    /// Bind address (e.g. "0.0.0.0:8100").
    pub bind_address: String,

    /// Directory of files to host.
    pub root: PathBuf,

    /// Basic auth username.
    pub username: String,

    /// Basic auth password.
    pub password: String,

    /// Upper bound on accepted upload bodies, in bytes.
    pub upload_limit: usize,

    /// Window after which an idle server shuts itself down.
    pub idle_timeout: Duration,

    /// Grace period for draining in-flight requests at shutdown.
    pub drain_timeout: Duration,
}

impl Default for FilerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8100".to_string(),
            root: PathBuf::from("."),
            username: "filer".to_string(),
            password: "filer".to_string(),
            upload_limit: 32 << 16,
            idle_timeout: Duration::from_secs(3600),
            drain_timeout: Duration::from_secs(1200),
        }
    }
}
