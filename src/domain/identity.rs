//! The two representations of a user identity.
//!
//! The platform backend is authoritative for identity and authentication and
//! hands out [`AuthIdentity`] records. The relational backend stores the
//! derived [`UserProfile`]. Both describe the same logical user and share
//! its [`UserId`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ContractError;
use super::id::UserId;

/// Free-form key/value metadata attached to a platform identity.
pub type Metadata = Map<String, Value>;

/// Metadata keys understood by the identity contract.
///
/// Each key lists the spelling that is written first, followed by the
/// accepted aliases.
pub mod keys {
    pub const USERNAME: &[&str] = &["username"];
    pub const FULL_NAME: &[&str] = &["fullName", "full_name"];
    pub const AVATAR_URL: &[&str] = &["avatarUrl", "avatar_url"];
    pub const ROLE: &[&str] = &["role"];
    pub const APP_ROLE: &[&str] = &["appRole", "app_role"];
    pub const PREFERENCES: &[&str] = &["preferences"];
}

/// Application role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Guest,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

impl FromStr for Role {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            other => Err(ContractError::violation(
                "role",
                format!("unknown role `{other}`, expected admin, user or guest"),
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record as stored by the platform backend.
///
/// This is a boundary type: the `id` is kept as the raw string the platform
/// returned and only becomes a [`UserId`] once the contract layer validates
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "user_metadata", alias = "metadata")]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl AuthIdentity {
    /// Look up the first present string value among `aliases`.
    ///
    /// Empty strings are treated as absent.
    #[must_use]
    pub fn metadata_str(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|key| self.metadata.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Role hint carried in metadata (`role`, then `appRole`), if any.
    #[must_use]
    pub fn role_hint(&self) -> Option<&str> {
        self.metadata_str(keys::ROLE)
            .or_else(|| self.metadata_str(keys::APP_ROLE))
    }
}

/// Domain user record as stored by the relational backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub preferences: Metadata,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity(metadata: Value) -> AuthIdentity {
        AuthIdentity {
            id: "6f1c2a9e-3b4d-4e5f-8a7b-9c0d1e2f3a4b".into(),
            email: None,
            phone: None,
            email_confirmed_at: None,
            metadata: metadata.as_object().cloned().unwrap_or_default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_sign_in_at: None,
        }
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" guest ".parse::<Role>().unwrap(), Role::Guest);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn metadata_str_checks_aliases_in_order() {
        let id = identity(json!({ "full_name": "Snake Case", "fullName": "" }));
        assert_eq!(id.metadata_str(keys::FULL_NAME), Some("Snake Case"));
    }

    #[test]
    fn role_hint_falls_back_to_app_role() {
        let id = identity(json!({ "appRole": "admin" }));
        assert_eq!(id.role_hint(), Some("admin"));

        let id = identity(json!({ "role": "guest", "appRole": "admin" }));
        assert_eq!(id.role_hint(), Some("guest"));
    }

    #[test]
    fn identity_deserializes_platform_payload() {
        let raw = json!({
            "id": "6f1c2a9e-3b4d-4e5f-8a7b-9c0d1e2f3a4b",
            "email": "ada@example.com",
            "email_confirmed_at": "2026-01-02T03:04:05Z",
            "user_metadata": { "username": "ada" },
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z"
        });
        let id: AuthIdentity = serde_json::from_value(raw).unwrap();
        assert_eq!(id.email.as_deref(), Some("ada@example.com"));
        assert_eq!(id.metadata_str(keys::USERNAME), Some("ada"));
        assert!(id.last_sign_in_at.is_none());
    }
}
