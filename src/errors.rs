// src/errors.rs

//! Crate-wide error type and the exit code contract shared by every `prun`
//! binary.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Exit code for an unidentified error starting or waiting on a command.
pub const EXIT_ERROR: i32 = 1;
/// Exit code for invalid command-line arguments.
pub const EXIT_BAD_ARGS: i32 = 2;
/// Exit code used by `prunfor` when the time limit elapses.
pub const EXIT_TIMED_OUT: i32 = 3;
/// Exit code for a command that could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code for a command that failed without a numeric exit status.
pub const EXIT_UNKNOWN_STATUS: i32 = 255;

#[derive(Error, Debug)]
pub enum PrunError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}: not found")]
    NotFound(String),

    #[error("{command}: {source}")]
    Start {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("wait: {0}")]
    Wait(#[source] std::io::Error),

    #[error("kill: {0}")]
    Kill(#[source] std::io::Error),

    #[error("{command}: timed out after {limit:?}")]
    TimedOut { command: String, limit: Duration },

    #[error("command exited with status {0}")]
    ChildFailed(i32),

    #[error("corrupted log file: {0}")]
    CorruptLog(String),

    #[error("lock {path:?}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error whose diagnostic has already been written or deliberately
    /// held back, such as a failure `prunfail` keeps in its log.
    #[error("{0}")]
    Recorded(Box<PrunError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrunError {
    /// Process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            PrunError::InvalidArgument(_) => EXIT_BAD_ARGS,
            PrunError::NotFound(_) => EXIT_NOT_FOUND,
            PrunError::TimedOut { .. } => EXIT_TIMED_OUT,
            PrunError::ChildFailed(code) => exit_status_code(*code),
            PrunError::Recorded(inner) => inner.exit_code(),
            PrunError::Start { .. }
            | PrunError::Wait(_)
            | PrunError::Kill(_)
            | PrunError::CorruptLog(_)
            | PrunError::Lock { .. }
            | PrunError::Io(_)
            | PrunError::Other(_) => EXIT_ERROR,
        }
    }

    /// Whether `main` should print a diagnostic line for this error.
    ///
    /// A failed child has already written whatever it had to say.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, PrunError::ChildFailed(_) | PrunError::Recorded(_))
    }
}

/// Map a raw child status to something a process can exit with.
///
/// Codes the OS cannot carry (negative sentinels, values above 255) become
/// [`EXIT_UNKNOWN_STATUS`].
pub fn exit_status_code(code: i32) -> i32 {
    if (0..=255).contains(&code) {
        code
    } else {
        EXIT_UNKNOWN_STATUS
    }
}

pub type Result<T> = std::result::Result<T, PrunError>;
