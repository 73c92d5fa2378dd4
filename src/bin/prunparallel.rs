// src/bin/prunparallel.rs

//! Run a command many times with bounded concurrency.
//!
//! usage: prunparallel [--log-level LEVEL] TOTAL CONCUR INDEXTEMPLATE COMMAND [ARGUMENT ...]
//!
//! Exits with the first failing job's code, 127 if the command is missing,
//! 255 if a job failed without a numeric status.

use clap::Parser;
use prun::cli::ParallelArgs;
use prun::config::PoolConfig;
use prun::errors::Result;
use prun::{finish, logging, policy};

#[tokio::main]
async fn main() {
    let args = ParallelArgs::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("prunparallel: {err:?}");
        std::process::exit(1);
    }
    let code = finish("prunparallel", run_main(args).await);
    std::process::exit(code);
}

async fn run_main(args: ParallelArgs) -> Result<()> {
    let cfg = PoolConfig::try_from(args)?;
    policy::run_parallel(&cfg).await
}
