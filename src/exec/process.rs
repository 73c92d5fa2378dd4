// src/exec/process.rs

//! A single child process with a normalized start/wait/kill model.

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::errors::{
    EXIT_ERROR, EXIT_NOT_FOUND, PrunError, Result, exit_status_code,
};
use crate::exec::command::{CommandSpec, resolve_in_path};

/// Status reported when the OS gives no numeric code for a failed process.
pub const STATUS_FAILED_NO_CODE: i32 = -1;

/// What happened to a child, as seen by every policy.
#[derive(Debug)]
pub enum ExitOutcome {
    Success,
    Failure(i32),
    NotFound,
    WaitError(io::Error),
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    /// Exit code a wrapper should terminate with for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failure(code) => exit_status_code(*code),
            ExitOutcome::NotFound => EXIT_NOT_FOUND,
            ExitOutcome::WaitError(_) => EXIT_ERROR,
        }
    }

    /// Turn the outcome into the error a policy returns to `main`.
    pub fn into_result(self, spec: &CommandSpec) -> Result<()> {
        match self {
            ExitOutcome::Success => Ok(()),
            ExitOutcome::Failure(code) => Err(PrunError::ChildFailed(code)),
            ExitOutcome::NotFound => Err(PrunError::NotFound(spec.name().to_string())),
            ExitOutcome::WaitError(e) => Err(PrunError::Wait(e)),
        }
    }
}

/// Platform exit status reduced to the three cases the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedStatus {
    Code(i32),
    SuccessNoCode,
    FailureNoCode,
}

impl From<ResolvedStatus> for ExitOutcome {
    fn from(status: ResolvedStatus) -> Self {
        match status {
            ResolvedStatus::Code(0) | ResolvedStatus::SuccessNoCode => ExitOutcome::Success,
            ResolvedStatus::Code(code) => ExitOutcome::Failure(code),
            ResolvedStatus::FailureNoCode => ExitOutcome::Failure(STATUS_FAILED_NO_CODE),
        }
    }
}

/// Resolve an OS exit status. A signal-terminated process has no code.
pub fn resolve_status(status: ExitStatus) -> ResolvedStatus {
    match status.code() {
        Some(code) => ResolvedStatus::Code(code),
        None if status.success() => ResolvedStatus::SuccessNoCode,
        None => ResolvedStatus::FailureNoCode,
    }
}

/// Read end of a pipe carrying a child's stdout and stderr interleaved.
#[derive(Debug)]
pub struct CombinedOutput {
    reader: io::PipeReader,
}

impl Read for CombinedOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Owns exactly one running child process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    spec: CommandSpec,
}

impl ProcessHandle {
    /// Start `spec`, inheriting this process's stdin, stdout and stderr.
    pub fn start(spec: &CommandSpec) -> Result<Self> {
        let program = resolve_program(spec)?;
        let mut cmd = Command::new(program);
        cmd.args(spec.args());
        Self::spawn(spec, cmd)
    }

    /// Start `spec` with stdout and stderr both writing into one pipe.
    ///
    /// The returned reader sees the two streams in whatever order the OS
    /// delivers the writes and reaches EOF once the child (and anything it
    /// left holding the pipe) has exited.
    pub fn start_combined(spec: &CommandSpec) -> Result<(Self, CombinedOutput)> {
        let program = resolve_program(spec)?;
        let (reader, writer) = io::pipe()?;
        let writer_err = writer.try_clone()?;

        let mut cmd = Command::new(program);
        cmd.args(spec.args()).stdout(writer).stderr(writer_err);

        // `spawn` consumes `cmd`, closing our copies of the write end.
        let handle = Self::spawn(spec, cmd)?;
        Ok((handle, CombinedOutput { reader }))
    }

    fn spawn(spec: &CommandSpec, mut cmd: Command) -> Result<Self> {
        let child = cmd.spawn().map_err(|e| start_error(spec, e))?;
        debug!(command = %spec, pid = ?child.id(), "started process");
        Ok(Self {
            child,
            spec: spec.clone(),
        })
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// OS process id, if the child has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to terminate.
    pub async fn wait(&mut self) -> ExitOutcome {
        let outcome = match self.child.wait().await {
            Ok(status) => ExitOutcome::from(resolve_status(status)),
            Err(e) => ExitOutcome::WaitError(e),
        };
        debug!(command = %self.spec, ?outcome, "process exited");
        outcome
    }

    /// Forcefully terminate the child. Best effort: errors are returned,
    /// not raised.
    pub fn kill(&mut self) -> Result<()> {
        debug!(command = %self.spec, pid = ?self.child.id(), "killing process");
        self.child.start_kill().map_err(PrunError::Kill)
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.spec.fmt(f)
    }
}

/// Start `spec` and wait for it, folding a missing executable into
/// [`ExitOutcome::NotFound`]. Any other start failure stays an error.
pub async fn run_to_exit(spec: &CommandSpec) -> Result<ExitOutcome> {
    match ProcessHandle::start(spec) {
        Ok(mut handle) => Ok(handle.wait().await),
        Err(PrunError::NotFound(_)) => Ok(ExitOutcome::NotFound),
        Err(e) => Err(e),
    }
}

fn resolve_program(spec: &CommandSpec) -> Result<PathBuf> {
    if !spec.needs_lookup() {
        return Ok(PathBuf::from(spec.name()));
    }
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    resolve_in_path(spec.name(), &path_var)
        .ok_or_else(|| PrunError::NotFound(spec.name().to_string()))
}

fn start_error(spec: &CommandSpec, err: io::Error) -> PrunError {
    if err.kind() == io::ErrorKind::NotFound {
        PrunError::NotFound(spec.name().to_string())
    } else {
        PrunError::Start {
            command: spec.name().to_string(),
            source: err,
        }
    }
}
