//! Operator CLI for the dual-write storage layer.
//!
//! `validate` and `transform` run offline. The other commands open both
//! backends from configuration first.

pub mod command;
pub mod contract;
pub mod health;
pub mod identity;
pub mod output;

use std::path::Path;

use tracing::debug;

use self::command::{Cli, Commands};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
///
/// # Errors
///
/// Returns an error if an existing file cannot be parsed or is invalid.
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        Config::parse_toml("")
    }
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns the first error raised by the selected command.
pub async fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Validate(args) => contract::execute_validate(&args.identity, &args.profile),
        Commands::Transform(args) => contract::execute_transform(&args.identity),
        Commands::Health => {
            let services = bootstrap::build(config)?;
            health::execute(&services.coordinator, &config.service_name).await
        }
        Commands::Sync(args) => {
            let services = bootstrap::build(config)?;
            identity::execute_sync(&services.identity, &config.service_name, &args.identity).await
        }
        Commands::Reconcile(args) => {
            let services = bootstrap::build(config)?;
            identity::execute_reconcile(&services.identity, &config.service_name, &args.user_id)
                .await
        }
    }
}
