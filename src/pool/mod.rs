// src/pool/mod.rs

//! Bounded-parallel execution of one command template.
//!
//! - [`substitute`] builds per-job arguments from the index template.
//! - [`scheduler`] runs the dispatch loop, the workers and the aggregator.

pub mod scheduler;
pub mod substitute;

pub use scheduler::{PoolResult, run_pool};
pub use substitute::substitute;

use crate::exec::CommandSpec;

/// One scheduled unit of work: a job index and its fully substituted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub index: u64,
    pub spec: CommandSpec,
}

impl Job {
    /// Build job `index` from a command template.
    pub fn from_template(index: u64, template: &CommandSpec, index_template: &str) -> Self {
        let args = substitute(template.args(), index_template, index);
        Self {
            index,
            spec: template.with_args(args),
        }
    }
}
