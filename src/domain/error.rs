//! Contract errors for identity records.
//!
//! Raised at the boundary where a record coming from either backend is
//! checked against its schema. A record that fails here is rejected before
//! any write is attempted and is never retried.
//!
//! # Examples
//!
//! ```
//! use dualstore::domain::error::ContractError;
//! use dualstore::domain::id::UserId;
//!
//! let result = UserId::parse("not-a-uuid");
//! assert!(matches!(result, Err(ContractError::SchemaViolation { field: "id", .. })));
//! ```

use thiserror::Error;

/// Errors that occur when a record violates its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// A field is missing, malformed, or outside its allowed domain.
    #[error("schema violation on `{field}`: {reason}")]
    SchemaViolation {
        /// The offending field.
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl ContractError {
    pub(crate) fn violation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field,
            reason: reason.into(),
        }
    }

    /// The field the violation was raised against.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::SchemaViolation { field, .. } => field,
        }
    }
}
