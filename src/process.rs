//! Child process supervision.
//!
//! # Responsibilities
//! - Spawn the wrapped program with inherited standard streams
//! - Report its exit exactly once as a shutdown request
//! - Deliver graceful-then-forceful termination
//!
//! # Design Decisions
//! - The OS-level child is owned by the exit waiter; everyone else sees the
//!   pid and an exited flag
//! - `terminate` never waits for the child: termination request and exit
//!   observation are decoupled, confirmation comes from the waiter
//! - SIGTERM delivery failure escalates straight to SIGKILL

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::lifecycle::shutdown::ShutdownReason;

/// Spawn failures. Fatal to the supervisor: there is nothing to supervise
/// without the child.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("no command given: expected a program to supervise after --")]
    MissingCommand,
    #[error("failed to start {program}: {source}")]
    Start {
        program: String,
        source: std::io::Error,
    },
}

/// Handle to the running child.
///
/// Carries what the coordinator needs to decide on and deliver termination;
/// the OS child itself lives with the exit waiter.
#[derive(Clone, Debug)]
pub struct ChildHandle {
    pid: u32,
    exited: Arc<AtomicBool>,
}

impl ChildHandle {
    /// Process id of the supervised child.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the exit waiter has already observed the child's exit.
    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }
}

/// Spawn the supervised program with stdin/stdout/stderr passed through.
///
/// Also spawns the exit waiter, which posts `ShutdownReason::ChildExited`
/// exactly once when the OS reports termination.
pub fn spawn(
    command: &[String],
    requests: mpsc::Sender<ShutdownReason>,
) -> Result<ChildHandle, SpawnError> {
    let (program, args) = command.split_first().ok_or(SpawnError::MissingCommand)?;

    tracing::info!(program = %program, args = ?args, "Starting supervised command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| SpawnError::Start {
            program: program.clone(),
            source,
        })?;

    // Present until the child has been waited on, which only the waiter
    // below does.
    let pid = child.id().unwrap_or(0);
    tracing::info!(pid, "Supervised process started");

    let exited = Arc::new(AtomicBool::new(false));
    let waiter_flag = exited.clone();
    tokio::spawn(async move {
        let status = child.wait().await;
        waiter_flag.store(true, Ordering::SeqCst);
        let _ = requests.try_send(ShutdownReason::ChildExited(status));
    });

    Ok(ChildHandle { pid, exited })
}

/// Request child termination: SIGTERM first, SIGKILL if delivery fails.
///
/// Returns without waiting for the child to actually exit; a caller that
/// needs confirmation observes the waiter's shutdown request instead.
pub fn terminate(handle: &ChildHandle) {
    let pid = Pid::from_raw(handle.pid() as i32);

    tracing::info!(pid = handle.pid(), "Terminating supervised process");
    if let Err(err) = signal::kill(pid, Signal::SIGTERM) {
        tracing::warn!(
            pid = handle.pid(),
            error = %err,
            "Failed to send interrupt signal, force-killing"
        );
        if let Err(err) = signal::kill(pid, Signal::SIGKILL) {
            tracing::warn!(pid = handle.pid(), error = %err, "Force kill failed");
        }
    }
}
