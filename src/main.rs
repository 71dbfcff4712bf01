use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use dualstore::adapter::inbound::cli::{self, command::Cli, output, output::OutputConfig};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli::load_config(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    config.init_logging();
    debug!(service = %config.service_name, "dualstore starting");

    cli::run(cli, &config).await?;
    Ok(())
}
