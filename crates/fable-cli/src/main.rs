mod bootstrap_helpers;

use anyhow::{Context, Result};
use clap::Parser;

use fable_core::RelayConfig;
use fable_gateway::run_relay_server;

use crate::bootstrap_helpers::init_tracing;

#[derive(Debug, Parser)]
#[command(
    name = "fable",
    about = "Relay between the RPG front-end and the Gemini generateContent API"
)]
struct CliArgs {
    /// TCP port to listen on. Overrides the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let mut config = RelayConfig::from_env().context("relay configuration is incomplete")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    run_relay_server(config).await
}
