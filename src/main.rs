use std::process::ExitCode;

use alert_relay::{
    cli::{Cli, execute},
    config::Config,
    logging::init_logging,
};
use anyhow::{Error, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_logging(config.log_format);

    execute(cli, config).await
}
