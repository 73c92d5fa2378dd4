// src/exec/guard.rs

//! Deadline enforcement for a single running child.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::exec::process::{ExitOutcome, ProcessHandle};

/// Result of racing a child against its deadline.
#[derive(Debug)]
pub enum GuardOutcome {
    /// The child finished first; its outcome is passed through untouched.
    Exited(ExitOutcome),
    /// The deadline elapsed first and the child was killed.
    TimedOut,
}

/// Wait for `handle`, killing it if `deadline` elapses first.
///
/// A zero deadline means "no limit": no timer is started and this is a plain
/// `wait()`.
pub async fn wait_with_deadline(handle: &mut ProcessHandle, deadline: Duration) -> GuardOutcome {
    if deadline.is_zero() {
        return GuardOutcome::Exited(handle.wait().await);
    }

    // `select!` drops the losing branch, so exactly one outcome survives.
    tokio::select! {
        outcome = handle.wait() => return GuardOutcome::Exited(outcome),
        _ = sleep(deadline) => {}
    }

    warn!(
        command = %handle,
        pid = ?handle.id(),
        limit = ?deadline,
        "time limit exceeded; killing process"
    );

    if let Err(e) = handle.kill() {
        warn!(command = %handle, error = %e, "failed to kill timed out process");
    }

    // Reap it; whatever it reports no longer matters.
    let reaped = handle.wait().await;
    debug!(command = %handle, outcome = ?reaped, "reaped timed out process");

    GuardOutcome::TimedOut
}
