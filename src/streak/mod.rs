// src/streak/mod.rs

//! Failure-streak policy: run a command, keep its recent output in a log
//! file, and only surface failures on stderr once they have happened more
//! than a configured number of times in a row.
//!
//! - [`log_file`] owns the persisted log and its `fail <count>` trailer.
//! - The command's combined stdout/stderr is captured into a
//!   [`RingBuffer`] so only the most recent output is kept.

pub mod log_file;

pub use log_file::{FailureLog, MAX_LOG_SIZE};

use std::io::{self, Write};

use tracing::{debug, info};

use crate::config::StreakConfig;
use crate::errors::{PrunError, Result};
use crate::exec::{CombinedOutput, ProcessHandle};
use crate::ringbuf::RingBuffer;

/// Run `cfg.command` under the failure-streak policy.
///
/// Returns `Ok(())` when the command succeeded, otherwise the error the
/// wrapper should exit with. A corrupted log or a command that cannot be
/// started fails immediately, before the log is touched.
pub async fn run_streak(cfg: &StreakConfig) -> Result<()> {
    let mut stderr = io::stderr();
    run_streak_with(cfg, &mut stderr).await
}

/// [`run_streak`] with the diagnostic stream supplied by the caller.
pub async fn run_streak_with<W: Write>(cfg: &StreakConfig, diag: &mut W) -> Result<()> {
    let mut log = FailureLog::open(&cfg.log_path)?;

    let (mut handle, output) = ProcessHandle::start_combined(&cfg.command)?;
    let capture = tokio::task::spawn_blocking(move || capture_output(output));

    let outcome = handle.wait().await;
    let mut buffer = capture
        .await
        .map_err(|e| PrunError::Other(e.into()))??;

    match outcome.into_result(&cfg.command) {
        Ok(()) => {
            log.failures = 0;
            let data = buffer.bytes();
            log.write(&data)?;
            diag.write_all(&data)?;
            debug!(command = %cfg.command, "command succeeded; failure streak reset");
            Ok(())
        }
        Err(err) => {
            log.failures = log.failures.saturating_add(1);
            buffer.push(format!("{}: {err}\n", cfg.command).as_bytes());

            let emit = log.failures > cfg.max_failures;
            if emit {
                info!(
                    command = %cfg.command,
                    failures = log.failures,
                    max_failures = cfg.max_failures,
                    "failure streak exceeded; emitting output"
                );
                log.failures = 0;
            } else {
                debug!(command = %cfg.command, failures = log.failures, "failure recorded");
            }

            let data = buffer.bytes();
            log.write(&data)?;
            if emit {
                diag.write_all(&data)?;
            }
            Err(recorded(err))
        }
    }
}

/// The failure line is already in the log, and on stderr too once the
/// streak was emitted; keep `main` from printing it again.
fn recorded(err: PrunError) -> PrunError {
    if err.is_reportable() {
        PrunError::Recorded(Box::new(err))
    } else {
        err
    }
}

fn capture_output(mut output: CombinedOutput) -> io::Result<RingBuffer> {
    let mut buffer = RingBuffer::new(MAX_LOG_SIZE);
    io::copy(&mut output, &mut buffer)?;
    Ok(buffer)
}
