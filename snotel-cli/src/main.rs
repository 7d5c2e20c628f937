//! snotel - command line tool for SNOTEL snow data.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "snotel",
    version,
    about = "SNOTEL site queries, observation fetches and day-of-water-year normals"
)]
struct Cli {
    #[command(flatten)]
    api: snotel_cmd::ApiArgs,

    #[command(subcommand)]
    command: snotel_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Using AWDB service at {}", cli.api.api_url);
    snotel_cmd::run(&cli.api, cli.command).await
}
