//! Relational backend configuration.

use serde::Deserialize;

/// Relational store settings (`[relational]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationalConfig {
    /// Path to the SQLite database file, or `:memory:`.
    ///
    /// Defaults to "dualstore.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "dualstore.db".to_string()
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
        }
    }
}
