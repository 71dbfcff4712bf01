use thiserror::Error;

use crate::domain::error::ContractError;
use crate::domain::storage::Backend;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Per-backend storage failures.
///
/// None of these are fatal: the coordinator records them against the
/// backend that produced them and folds them into the consistency result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("{backend} backend unavailable: circuit open")]
    Unavailable { backend: Backend },

    #[error("{backend} write failed: {reason}")]
    Write { backend: Backend, reason: String },

    #[error("timeout")]
    Timeout { backend: Backend },

    /// No backend could serve the operation.
    #[error("{0}")]
    AllFailed(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the error is a contract rejection that must not be retried.
    #[must_use]
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Error::Contract(ContractError::SchemaViolation { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_displays_as_bare_timeout() {
        let err = StorageError::Timeout {
            backend: Backend::Platform,
        };
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn all_failed_names_no_single_backend() {
        let err = StorageError::AllFailed("no storage backend is healthy".into());
        assert_eq!(err.to_string(), "no storage backend is healthy");
    }

    #[test]
    fn schema_violation_is_detected_through_crate_error() {
        let err: Error = ContractError::SchemaViolation {
            field: "id",
            reason: "not a uuid".into(),
        }
        .into();
        assert!(err.is_schema_violation());

        let other = Error::Database("locked".into());
        assert!(!other.is_schema_violation());
    }
}
