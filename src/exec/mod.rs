// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that touches child processes lives here, on top of
//! `tokio::process`:
//!
//! - [`command`] describes what to run and resolves bare names via `PATH`.
//! - [`process`] owns one child and normalizes its exit into [`ExitOutcome`].
//! - [`guard`] races a child against a deadline and kills it on timeout.
//! - [`backend`] provides the `JobRunner` trait used by the worker pool and
//!   the production `ProcessRunner`; tests replace it with fakes.

pub mod backend;
pub mod command;
pub mod guard;
pub mod process;

pub use backend::{JobRunner, ProcessRunner};
pub use command::CommandSpec;
pub use guard::{GuardOutcome, wait_with_deadline};
pub use process::{CombinedOutput, ExitOutcome, ProcessHandle, ResolvedStatus, resolve_status};
