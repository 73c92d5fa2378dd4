// src/bin/prunfail.rs

use clap::Parser;
use prun::cli::FailArgs;
use prun::config::StreakConfig;
use prun::errors::Result;
use prun::{finish, logging, policy};

#[tokio::main]
async fn main() {
    let args = FailArgs::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("prunfail: {err:?}");
        std::process::exit(1);
    }
    let code = finish("prunfail", run_main(args).await);
    std::process::exit(code);
}

async fn run_main(args: FailArgs) -> Result<()> {
    let cfg = StreakConfig::try_from(args)?;
    policy::run_streak(&cfg).await
}
