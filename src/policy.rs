// src/policy.rs

//! One entry point per `prun` binary.
//!
//! Every policy returns `Ok(())` when the wrapped command succeeded and
//! otherwise the [`PrunError`] whose exit code the binary should terminate
//! with. None of them exit the process themselves.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::config::{ExclusiveConfig, PoolConfig, SleepConfig, StreakConfig, TimedConfig};
use crate::errors::{PrunError, Result};
use crate::exec::{GuardOutcome, ProcessHandle, ProcessRunner, wait_with_deadline};
use crate::lock::LockFile;
use crate::pool::run_pool;

/// `prunfor`: run with a time limit.
pub async fn run_timed(cfg: &TimedConfig) -> Result<()> {
    let mut handle = ProcessHandle::start(&cfg.command)?;
    match wait_with_deadline(&mut handle, cfg.limit).await {
        GuardOutcome::Exited(outcome) => outcome.into_result(&cfg.command),
        GuardOutcome::TimedOut => Err(PrunError::TimedOut {
            command: cfg.command.to_string(),
            limit: cfg.limit,
        }),
    }
}

/// `prunparallel`: run `total` copies with bounded concurrency.
pub async fn run_parallel(cfg: &PoolConfig) -> Result<()> {
    let result = run_pool(cfg, Arc::new(ProcessRunner)).await?;
    match result.exit_code {
        0 => Ok(()),
        code => Err(PrunError::ChildFailed(code)),
    }
}

/// `prunex`: run while holding the command's lock file.
pub async fn run_exclusive(cfg: &ExclusiveConfig) -> Result<()> {
    debug!(path = ?cfg.lock_path, "waiting for lock");
    let _lock = LockFile::acquire(&cfg.lock_path).await?;

    let mut handle = ProcessHandle::start(&cfg.command)?;
    handle.wait().await.into_result(&cfg.command)
}

/// `prunfail`: run under the failure-streak policy.
pub async fn run_streak(cfg: &StreakConfig) -> Result<()> {
    crate::streak::run_streak(cfg).await
}

/// `prunsleep`: sleep a random duration below the bound, then run.
pub async fn run_sleep(cfg: &SleepConfig) -> Result<()> {
    let delay = random_delay(cfg.bound);
    if !delay.is_zero() {
        info!(?delay, bound = ?cfg.bound, "sleeping before running command");
        tokio::time::sleep(delay).await;
    }

    let mut handle = ProcessHandle::start(&cfg.command)?;
    handle.wait().await.into_result(&cfg.command)
}

/// Uniformly random duration in `[0, bound)`; zero for a zero bound.
pub fn random_delay(bound: Duration) -> Duration {
    let nanos = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rand::thread_rng().gen_range(0..nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_stays_below_bound() {
        assert_eq!(random_delay(Duration::ZERO), Duration::ZERO);
        let bound = Duration::from_millis(5);
        for _ in 0..100 {
            assert!(random_delay(bound) < bound);
        }
    }
}
