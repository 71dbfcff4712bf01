//! Schema checks for both identity representations.
//!
//! All validation happens here, at the boundary. Transform and scoring code
//! assumes records that passed these checks.

use crate::domain::{AuthIdentity, ContractError, UserId, UserProfile};

/// Longest username the relational schema accepts.
pub const MAX_USERNAME_LEN: usize = 64;

const MAX_EMAIL_LEN: usize = 254;
const MAX_EMAIL_LOCAL_LEN: usize = 64;

/// Check an email address for basic well-formedness.
///
/// Deliberately structural: one `@`, a non-empty local part, and a dotted
/// domain made of letters, digits and hyphens.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > MAX_EMAIL_LOCAL_LEN || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}

fn check_email(email: Option<&str>) -> Result<(), ContractError> {
    match email {
        Some(email) if !is_valid_email(email) => Err(ContractError::violation(
            "email",
            format!("`{email}` is not a well-formed email address"),
        )),
        _ => Ok(()),
    }
}

fn check_non_blank(field: &'static str, value: Option<&str>) -> Result<(), ContractError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(ContractError::violation(field, "must not be blank when present"))
        }
        _ => Ok(()),
    }
}

/// Validate a platform identity and return its parsed id.
///
/// # Errors
///
/// Returns [`ContractError::SchemaViolation`] when the id is not a UUID,
/// the email is present but malformed, or the phone is present but blank.
pub fn validate_identity(identity: &AuthIdentity) -> Result<UserId, ContractError> {
    let id = UserId::parse(&identity.id)?;
    check_email(identity.email.as_deref())?;
    check_non_blank("phone", identity.phone.as_deref())?;
    Ok(id)
}

/// Validate a relational profile.
///
/// # Errors
///
/// Returns [`ContractError::SchemaViolation`] on the first failing field.
pub fn validate_profile(profile: &UserProfile) -> Result<(), ContractError> {
    let username = profile.username.as_str();
    if username.is_empty() {
        return Err(ContractError::violation("username", "is required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ContractError::violation(
            "username",
            format!("longer than {MAX_USERNAME_LEN} characters"),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(ContractError::violation(
            "username",
            "must not contain whitespace",
        ));
    }
    check_email(profile.email.as_deref())?;
    check_non_blank("full_name", profile.full_name.as_deref())?;
    if let Some(avatar) = profile.avatar_url.as_deref() {
        url::Url::parse(avatar).map_err(|e| {
            ContractError::violation("avatar_url", format!("`{avatar}` is not a URL: {e}"))
        })?;
    }
    Ok(())
}
