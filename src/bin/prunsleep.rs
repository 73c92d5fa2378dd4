// src/bin/prunsleep.rs

use clap::Parser;
use prun::cli::SleepArgs;
use prun::config::SleepConfig;
use prun::errors::Result;
use prun::{finish, logging, policy};

#[tokio::main]
async fn main() {
    let args = SleepArgs::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("prunsleep: {err:?}");
        std::process::exit(1);
    }
    let code = finish("prunsleep", run_main(args).await);
    std::process::exit(code);
}

async fn run_main(args: SleepArgs) -> Result<()> {
    let cfg = SleepConfig::from(args);
    policy::run_sleep(&cfg).await
}
