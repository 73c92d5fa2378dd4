// src/bin/prunfor.rs

//! Run a command with an optional time limit.
//!
//! usage: prunfor [--log-level LEVEL] LIMIT COMMAND [ARGUMENT ...]

use clap::Parser;
use prun::cli::ForArgs;
use prun::config::TimedConfig;
use prun::errors::Result;
use prun::{finish, logging, policy};

#[tokio::main]
async fn main() {
    let args = ForArgs::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("prunfor: {err:?}");
        std::process::exit(1);
    }
    let code = finish("prunfor", run_main(args).await);
    std::process::exit(code);
}

async fn run_main(args: ForArgs) -> Result<()> {
    let cfg = TimedConfig::from(args);
    policy::run_timed(&cfg).await
}
