//! Conversions between the platform identity and the relational profile.

use serde_json::Value;

use super::schema::{validate_identity, validate_profile};
use crate::domain::identity::keys;
use crate::domain::{AuthIdentity, ContractError, Metadata, Role, UserProfile};

/// Prefix for usernames derived from the user id.
pub const PLACEHOLDER_USERNAME_PREFIX: &str = "user_";

/// Derive the relational profile from a platform identity.
///
/// Username falls back from `metadata.username` to the email local part to
/// `user_` plus the first eight characters of the id. Role falls back from
/// `metadata.role` to `metadata.appRole` to [`Role::User`].
///
/// # Errors
///
/// Returns [`ContractError::SchemaViolation`] if the identity fails its
/// schema, carries an unknown role, or the derived profile fails the
/// relational schema.
pub fn transform_b_to_a(identity: &AuthIdentity) -> Result<UserProfile, ContractError> {
    let id = validate_identity(identity)?;

    let username = identity
        .metadata_str(keys::USERNAME)
        .map(str::to_string)
        .or_else(|| {
            identity
                .email
                .as_deref()
                .and_then(|email| email.split_once('@'))
                .map(|(local, _)| local.to_string())
        })
        .unwrap_or_else(|| format!("{PLACEHOLDER_USERNAME_PREFIX}{}", id.short()));

    let role = identity
        .role_hint()
        .map(str::parse::<Role>)
        .transpose()?
        .unwrap_or_default();

    let preferences = match first_present(&identity.metadata, keys::PREFERENCES) {
        None | Some(Value::Null) => Metadata::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(ContractError::violation(
                "preferences",
                "must be an object",
            ))
        }
    };

    let profile = UserProfile {
        id,
        email: identity.email.clone(),
        username,
        full_name: identity.metadata_str(keys::FULL_NAME).map(str::to_string),
        avatar_url: identity.metadata_str(keys::AVATAR_URL).map(str::to_string),
        role,
        is_email_verified: identity.email_confirmed_at.is_some(),
        preferences,
        last_sign_in_at: identity.last_sign_in_at,
        created_at: identity.created_at,
        updated_at: identity.updated_at,
    };

    validate_profile(&profile)?;
    Ok(profile)
}

/// Project a relational profile onto the fields the platform stores.
///
/// Lossy: the platform keeps `role` only as an advisory metadata entry, has
/// no phone for the user, and learns of email confirmation only as a
/// timestamp (the profile's `updated_at` stands in for it).
#[must_use]
pub fn transform_a_to_b(profile: &UserProfile) -> AuthIdentity {
    let mut metadata = Metadata::new();
    metadata.insert(keys::USERNAME[0].into(), Value::from(profile.username.clone()));
    if let Some(name) = &profile.full_name {
        metadata.insert(keys::FULL_NAME[0].into(), Value::from(name.clone()));
    }
    if let Some(avatar) = &profile.avatar_url {
        metadata.insert(keys::AVATAR_URL[0].into(), Value::from(avatar.clone()));
    }
    metadata.insert(keys::ROLE[0].into(), Value::from(profile.role.as_str()));
    if !profile.preferences.is_empty() {
        metadata.insert(
            keys::PREFERENCES[0].into(),
            Value::Object(profile.preferences.clone()),
        );
    }

    AuthIdentity {
        id: profile.id.to_string(),
        email: profile.email.clone(),
        phone: None,
        email_confirmed_at: profile.is_email_verified.then_some(profile.updated_at),
        metadata,
        created_at: profile.created_at,
        updated_at: profile.updated_at,
        last_sign_in_at: profile.last_sign_in_at,
    }
}

fn first_present<'a>(metadata: &'a Metadata, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| metadata.get(*key))
}
