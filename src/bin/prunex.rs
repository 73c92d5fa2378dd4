// src/bin/prunex.rs

use clap::Parser;
use prun::cli::ExArgs;
use prun::config::ExclusiveConfig;
use prun::errors::Result;
use prun::{finish, logging, policy};

#[tokio::main]
async fn main() {
    let args = ExArgs::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("prunex: {err:?}");
        std::process::exit(1);
    }
    let code = finish("prunex", run_main(args).await);
    std::process::exit(code);
}

async fn run_main(args: ExArgs) -> Result<()> {
    let cfg = ExclusiveConfig::from(args);
    policy::run_exclusive(&cfg).await
}
