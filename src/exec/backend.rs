// src/exec/backend.rs

//! Pluggable job runner abstraction.
//!
//! The worker pool talks to a `JobRunner` instead of spawning processes
//! itself. Production code uses [`ProcessRunner`]; tests can provide their
//! own implementation that records what ran and returns scripted codes
//! without touching the OS.

use std::future::Future;
use std::pin::Pin;

use tracing::{info, warn};

use crate::exec::process::run_to_exit;
use crate::pool::Job;

/// Trait abstracting how a single pool job is executed.
pub trait JobRunner: Send + Sync + 'static {
    /// Run `job` to completion and return the exit code to report.
    ///
    /// Implementations never fail: every problem is folded into a code.
    fn run_job(&self, job: Job) -> Pin<Box<dyn Future<Output = i32> + Send + '_>>;
}

/// Runs each job as a real child process inheriting stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl JobRunner for ProcessRunner {
    fn run_job(&self, job: Job) -> Pin<Box<dyn Future<Output = i32> + Send + '_>> {
        Box::pin(async move {
            match run_to_exit(&job.spec).await {
                Ok(outcome) => {
                    let code = outcome.code();
                    info!(index = job.index, command = %job.spec, code, "job finished");
                    code
                }
                Err(e) => {
                    warn!(index = job.index, command = %job.spec, error = %e, "job failed to start");
                    e.exit_code()
                }
            }
        })
    }
}
