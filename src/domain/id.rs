//! Identifier types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ContractError;

/// Identifier shared by both representations of a user.
///
/// The relational profile and the platform identity of the same logical
/// user always carry the same `UserId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a hyphenated UUID string.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::SchemaViolation`] on field `id` when the
    /// input is not a well-formed UUID.
    pub fn parse(raw: &str) -> Result<Self, ContractError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|e| ContractError::violation("id", format!("`{raw}` is not a valid UUID: {e}")))
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight characters of the hyphenated form.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl FromStr for UserId {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
