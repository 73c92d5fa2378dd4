// src/cli.rs

//! CLI argument parsing using `clap`, one parser per `prun` binary.
//!
//! Every binary takes its policy parameters as leading positionals followed
//! by the command to run. Everything after the command name is passed to it
//! verbatim, including values that look like flags.

use std::time::Duration;

use clap::{Args, Parser, ValueEnum};

use crate::duration::parse_duration;
use crate::exec::CommandSpec;

/// The wrapped command and its arguments.
///
/// Kept as one trailing list so that nothing after the command name, not
/// even `-h`, is interpreted by the wrapper.
#[derive(Debug, Clone, Args)]
pub struct CommandArgs {
    /// Command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub argv: Vec<String>,
}

impl CommandArgs {
    pub fn to_spec(&self) -> CommandSpec {
        match self.argv.split_first() {
            Some((name, args)) => CommandSpec::new(name.clone(), args.to_vec()),
            None => CommandSpec::new(String::new(), Vec::new()),
        }
    }
}

/// `prunfor`: run a command for a limited amount of time.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prunfor",
    version,
    about = "Run a command, killing it if it exceeds a time limit.",
    long_about = "Run a command, killing it if it exceeds a time limit.\n\n\
                  LIMIT is a non-negative duration such as 300ms, 10s or 1h30m; \
                  0 means no limit. Exits 3 if the limit is exceeded."
)]
pub struct ForArgs {
    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Time limit for the command (0 = unlimited).
    #[arg(value_name = "LIMIT", value_parser = parse_duration)]
    pub limit: Duration,

    #[command(flatten)]
    pub command: CommandArgs,
}

/// `prunparallel`: run a command many times with bounded concurrency.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prunparallel",
    version,
    about = "Run a command TOTAL times, at most CONCUR at once.",
    long_about = "Run a command TOTAL times, at most CONCUR at once.\n\n\
                  Every occurrence of INDEXTEMPLATE in the arguments is replaced with \
                  the 0-based job index; an empty INDEXTEMPLATE disables substitution. \
                  After the first failure no new jobs are started, running ones finish, \
                  and the first failure's exit code is returned."
)]
pub struct ParallelArgs {
    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Total number of times to run the command.
    #[arg(value_name = "TOTAL", value_parser = parse_uint_literal)]
    pub total: u64,

    /// Maximum number of concurrently running commands (at least 1).
    #[arg(value_name = "CONCUR", value_parser = parse_uint_literal)]
    pub concurrency: u64,

    /// Token replaced with the job index in every argument.
    #[arg(value_name = "INDEXTEMPLATE", allow_hyphen_values = true)]
    pub index_template: String,

    #[command(flatten)]
    pub command: CommandArgs,
}

/// `prunex`: run a command exclusively.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prunex",
    version,
    about = "Run a command, waiting until no other prunex runs the same command line."
)]
pub struct ExArgs {
    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(flatten)]
    pub command: CommandArgs,
}

/// `prunfail`: only report failures after a streak of them.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prunfail",
    version,
    about = "Run a command, reporting its output only on success or after MAXFAIL consecutive failures."
)]
pub struct FailArgs {
    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Consecutive failures tolerated before output is shown (at least 1).
    #[arg(value_name = "MAXFAIL", value_parser = parse_uint_literal)]
    pub max_failures: u64,

    #[command(flatten)]
    pub command: CommandArgs,
}

/// `prunsleep`: run a command after a random delay.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prunsleep",
    version,
    about = "Sleep a random duration in [0, BOUND), then run a command."
)]
pub struct SleepArgs {
    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Upper bound of the random delay (0 = run immediately).
    #[arg(value_name = "BOUND", value_parser = parse_duration)]
    pub bound: Duration,

    #[command(flatten)]
    pub command: CommandArgs,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse an unsigned integer literal: decimal, or `0x`/`0o`/`0b` prefixed.
pub fn parse_uint_literal(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, radix) = match s.get(..2) {
        Some("0x") | Some("0X") => (&s[2..], 16),
        Some("0o") | Some("0O") => (&s[2..], 8),
        Some("0b") | Some("0B") => (&s[2..], 2),
        _ => (s, 10),
    };
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid number {s:?}: {e}"))
}
