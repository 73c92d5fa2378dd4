// src/config.rs

//! Immutable per-policy configuration values.
//!
//! Each binary parses its CLI arguments and converts them here, with
//! validation, into the value its policy runs with. Nothing in this crate
//! reads global mutable state after that point.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{ExArgs, FailArgs, ForArgs, ParallelArgs, SleepArgs};
use crate::errors::{PrunError, Result};
use crate::exec::CommandSpec;
use crate::key::make_key;

/// Environment variable overriding where lock and log files live.
pub const STATE_DIR_ENV: &str = "PRUN_TMPDIR";

/// Directory for lock and log files: `PRUN_TMPDIR` if set, else the OS
/// temporary directory.
pub fn state_dir() -> PathBuf {
    match std::env::var_os(STATE_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir(),
    }
}

/// `prunfor`.
#[derive(Debug, Clone)]
pub struct TimedConfig {
    /// Zero means unlimited.
    pub limit: Duration,
    pub command: CommandSpec,
}

impl From<ForArgs> for TimedConfig {
    fn from(args: ForArgs) -> Self {
        Self {
            limit: args.limit,
            command: args.command.to_spec(),
        }
    }
}

/// `prunparallel`.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub total: u64,
    pub concurrency: u64,
    /// Empty disables substitution.
    pub index_template: String,
    pub command: CommandSpec,
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PrunError::InvalidArgument(
                "concur must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of workers the pool starts.
    pub fn workers(&self) -> u64 {
        self.concurrency.min(self.total)
    }
}

impl TryFrom<ParallelArgs> for PoolConfig {
    type Error = PrunError;

    fn try_from(args: ParallelArgs) -> Result<Self> {
        let cfg = Self {
            total: args.total,
            concurrency: args.concurrency,
            index_template: args.index_template,
            command: args.command.to_spec(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// `prunex`.
#[derive(Debug, Clone)]
pub struct ExclusiveConfig {
    pub command: CommandSpec,
    pub lock_path: PathBuf,
}

impl ExclusiveConfig {
    pub fn new(command: CommandSpec, dir: PathBuf) -> Self {
        let key = make_key(command.name(), command.args());
        let lock_path = dir.join(format!("prunex_local_{key}"));
        Self { command, lock_path }
    }
}

impl From<ExArgs> for ExclusiveConfig {
    fn from(args: ExArgs) -> Self {
        Self::new(args.command.to_spec(), state_dir())
    }
}

/// `prunfail`.
#[derive(Debug, Clone)]
pub struct StreakConfig {
    /// Failures tolerated in a row before output is emitted.
    pub max_failures: u32,
    pub command: CommandSpec,
    pub log_path: PathBuf,
}

impl StreakConfig {
    pub fn new(max_failures: u32, command: CommandSpec, dir: PathBuf) -> Result<Self> {
        if max_failures < 1 {
            return Err(PrunError::InvalidArgument(
                "maxfail must be positive".to_string(),
            ));
        }
        let key = make_key(command.name(), command.args());
        let log_path = dir.join(format!("prunfail_{key}.log"));
        Ok(Self {
            max_failures,
            command,
            log_path,
        })
    }
}

impl TryFrom<FailArgs> for StreakConfig {
    type Error = PrunError;

    fn try_from(args: FailArgs) -> Result<Self> {
        let max_failures = u32::try_from(args.max_failures).map_err(|_| {
            PrunError::InvalidArgument(format!("maxfail out of range: {}", args.max_failures))
        })?;
        Self::new(max_failures, args.command.to_spec(), state_dir())
    }
}

/// `prunsleep`.
#[derive(Debug, Clone)]
pub struct SleepConfig {
    /// Zero means run immediately.
    pub bound: Duration,
    pub command: CommandSpec,
}

impl From<SleepArgs> for SleepConfig {
    fn from(args: SleepArgs) -> Self {
        Self {
            bound: args.bound,
            command: args.command.to_spec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn zero_concurrency_is_rejected() {
        let args = ParallelArgs::try_parse_from(["prunparallel", "3", "0", "{}", "true"]).unwrap();
        let err = PoolConfig::try_from(args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn workers_clamp_to_total() {
        let cfg = PoolConfig {
            total: 3,
            concurrency: 8,
            index_template: String::new(),
            command: CommandSpec::new("true", vec![]),
        };
        assert_eq!(cfg.workers(), 3);
        assert_eq!(PoolConfig { total: 10, ..cfg }.workers(), 8);
    }

    #[test]
    fn zero_max_failures_is_rejected() {
        let err = StreakConfig::new(0, CommandSpec::new("true", vec![]), PathBuf::from("/tmp"))
            .unwrap_err();
        assert!(matches!(err, PrunError::InvalidArgument(_)));
    }

    #[test]
    fn state_files_are_named_by_command_key() {
        let spec = CommandSpec::new("ls", vec!["-l".to_string()]);
        let ex = ExclusiveConfig::new(spec.clone(), PathBuf::from("/state"));
        assert_eq!(ex.lock_path, PathBuf::from("/state/prunex_local_ls_l"));

        let streak = StreakConfig::new(2, spec, PathBuf::from("/state")).unwrap();
        assert_eq!(streak.log_path, PathBuf::from("/state/prunfail_ls_l.log"));
    }
}
