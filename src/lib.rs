// src/lib.rs

//! `prun`: small wrappers that run a command under an execution policy.
//!
//! - `prunex` runs a command exclusively, guarded by a lock file.
//! - `prunfor` runs a command with a time limit.
//! - `prunfail` only reports failures after a streak of them.
//! - `prunparallel` runs a command N times with bounded concurrency.
//! - `prunsleep` runs a command after a random delay.
//!
//! Each binary parses its arguments ([`cli`]), builds an immutable
//! configuration ([`config`]) and calls one function in [`policy`]. The
//! policies sit on top of the process layer in [`exec`] and the worker pool
//! in [`pool`].

pub mod cli;
pub mod config;
pub mod duration;
pub mod errors;
pub mod exec;
pub mod key;
pub mod lock;
pub mod logging;
pub mod policy;
pub mod pool;
pub mod ringbuf;
pub mod streak;

use crate::errors::Result;

/// Turn a policy result into the process exit code, printing the single
/// diagnostic line for errors the user has not already seen.
///
/// Only `main` should act on the returned code.
pub fn finish(binary: &str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            if err.is_reportable() {
                eprintln!("{binary}: {err}");
            }
            err.exit_code()
        }
    }
}
