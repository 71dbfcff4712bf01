//! Command-line interface definitions.
//!
//! Defines the operator CLI for the dual-write storage layer using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Dual-backend storage operator CLI
#[derive(Parser, Debug)]
#[command(name = "dualstore")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults apply when it is missing)
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe both backends and show breaker states
    Health,

    /// Sync a platform identity into both backends
    Sync(IdentityArg),

    /// Compare what each backend holds for one user
    Reconcile(ReconcileArgs),

    /// Check an identity and a profile against the sync contract (offline)
    Validate(ValidateArgs),

    /// Print the profile derived from a platform identity (offline)
    Transform(IdentityArg),
}

/// A platform identity read from a JSON file.
#[derive(Args, Debug)]
pub struct IdentityArg {
    /// Path to the identity JSON
    pub identity: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// User id (UUID)
    pub user_id: String,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the platform identity JSON
    pub identity: PathBuf,
    /// Path to the relational profile JSON
    pub profile: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["dualstore", "health", "--json", "-c", "other.toml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Health));
    }

    #[test]
    fn validate_takes_two_paths() {
        let cli = Cli::try_parse_from(["dualstore", "validate", "a.json", "b.json"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.identity, PathBuf::from("a.json"));
                assert_eq!(args.profile, PathBuf::from("b.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
