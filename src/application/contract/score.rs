//! Consistency scoring for identity records.
//!
//! Scores run from 0 to 100. A score of 100 always comes with an empty
//! violation list, and any lower score with at least one violation.

use std::fmt;

use serde::Serialize;

use super::schema::{validate_identity, validate_profile};
use super::transform::PLACEHOLDER_USERNAME_PREFIX;
use crate::domain::identity::keys;
use crate::domain::{AuthIdentity, ContractError, Role, UserId, UserProfile};

pub const MAX_SCORE: u8 = 100;

pub const ID_MISMATCH_PENALTY: u8 = 30;
pub const EMAIL_MISMATCH_PENALTY: u8 = 20;
pub const ROLE_MISMATCH_PENALTY: u8 = 15;

const MISSING_EMAIL_PENALTY: u8 = 20;
const UNVERIFIED_EMAIL_PENALTY: u8 = 10;
const PLACEHOLDER_USERNAME_PENALTY: u8 = 10;
const MISSING_FULL_NAME_PENALTY: u8 = 5;
const MISSING_AVATAR_PENALTY: u8 = 5;

/// Which way a sync runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncDirection {
    /// Platform identity (Store B) into the relational profile (Store A).
    PlatformToRelational,
    /// Relational profile (Store A) back out to the platform (Store B).
    RelationalToPlatform,
}

/// Either representation of a user, borrowed for comparison.
#[derive(Debug, Clone, Copy)]
pub enum ContractSubject<'a> {
    Identity(&'a AuthIdentity),
    Profile(&'a UserProfile),
}

/// One broken expectation and what it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractViolation {
    pub field: &'static str,
    pub message: String,
    pub penalty: u8,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (-{})", self.field, self.message, self.penalty)
    }
}

/// Outcome of comparing two records of the same user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub direction: SyncDirection,
    pub is_valid: bool,
    pub violations: Vec<ContractViolation>,
    pub score: u8,
}

/// Data-quality score for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub score: u8,
    pub violations: Vec<ContractViolation>,
}

/// The fields the sync contract compares.
struct ContractView {
    id: UserId,
    email: Option<String>,
    role: Option<Role>,
}

impl ContractSubject<'_> {
    fn view(self) -> Result<ContractView, ContractError> {
        match self {
            Self::Identity(identity) => {
                let id = validate_identity(identity)?;
                let role: Option<Role> = identity.role_hint().map(str::parse).transpose()?;
                Ok(ContractView {
                    id,
                    email: identity.email.clone(),
                    role,
                })
            }
            Self::Profile(profile) => {
                validate_profile(profile)?;
                Ok(ContractView {
                    id: profile.id,
                    email: profile.email.clone(),
                    role: Some(profile.role),
                })
            }
        }
    }
}

fn tally(violations: &[ContractViolation]) -> u8 {
    let lost: u32 = violations.iter().map(|v| u32::from(v.penalty)).sum();
    u32::from(MAX_SCORE).saturating_sub(lost) as u8
}

fn schema_failure(side: &str, err: &ContractError) -> ContractViolation {
    ContractViolation {
        field: err.field(),
        message: format!("{side} record failed schema validation: {err}"),
        penalty: MAX_SCORE,
    }
}

fn show(value: Option<&str>) -> &str {
    value.unwrap_or("<none>")
}

/// Compare two representations of the same user.
///
/// Deductions: id mismatch 30, email mismatch 20, role mismatch 15 (only
/// when both sides carry a role). A record that fails its schema scores 0
/// with a single violation describing the failure.
#[must_use]
pub fn validate_sync_contract(
    direction: SyncDirection,
    source: ContractSubject<'_>,
    target: ContractSubject<'_>,
) -> SyncReport {
    let views = source
        .view()
        .map_err(|e| schema_failure("source", &e))
        .and_then(|s| target.view().map(|t| (s, t)).map_err(|e| schema_failure("target", &e)));

    let (source, target) = match views {
        Ok(pair) => pair,
        Err(violation) => {
            return SyncReport {
                direction,
                is_valid: false,
                violations: vec![violation],
                score: 0,
            }
        }
    };

    let mut violations = Vec::new();
    if source.id != target.id {
        violations.push(ContractViolation {
            field: "id",
            message: format!("source id {} != target id {}", source.id, target.id),
            penalty: ID_MISMATCH_PENALTY,
        });
    }
    if source.email != target.email {
        violations.push(ContractViolation {
            field: "email",
            message: format!(
                "source email {} != target email {}",
                show(source.email.as_deref()),
                show(target.email.as_deref())
            ),
            penalty: EMAIL_MISMATCH_PENALTY,
        });
    }
    if let (Some(a), Some(b)) = (source.role, target.role) {
        if a != b {
            violations.push(ContractViolation {
                field: "role",
                message: format!("source role {a} != target role {b}"),
                penalty: ROLE_MISMATCH_PENALTY,
            });
        }
    }

    SyncReport {
        direction,
        is_valid: violations.is_empty(),
        score: tally(&violations),
        violations,
    }
}

fn quality_failure(err: &ContractError) -> QualityReport {
    QualityReport {
        score: 0,
        violations: vec![schema_failure("record", err)],
    }
}

fn completeness(
    email: Option<&str>,
    verified: bool,
    username: Option<&str>,
    full_name: Option<&str>,
    avatar: Option<&str>,
) -> QualityReport {
    let mut violations = Vec::new();
    match email {
        None => violations.push(ContractViolation {
            field: "email",
            message: "no email address".into(),
            penalty: MISSING_EMAIL_PENALTY,
        }),
        Some(_) if !verified => violations.push(ContractViolation {
            field: "email",
            message: "email not verified".into(),
            penalty: UNVERIFIED_EMAIL_PENALTY,
        }),
        Some(_) => {}
    }
    if username.map_or(true, |u| u.starts_with(PLACEHOLDER_USERNAME_PREFIX)) {
        violations.push(ContractViolation {
            field: "username",
            message: "username is missing or a generated placeholder".into(),
            penalty: PLACEHOLDER_USERNAME_PENALTY,
        });
    }
    if full_name.is_none() {
        violations.push(ContractViolation {
            field: "full_name",
            message: "no full name".into(),
            penalty: MISSING_FULL_NAME_PENALTY,
        });
    }
    if avatar.is_none() {
        violations.push(ContractViolation {
            field: "avatar_url",
            message: "no avatar".into(),
            penalty: MISSING_AVATAR_PENALTY,
        });
    }
    QualityReport {
        score: tally(&violations),
        violations,
    }
}

/// Data-quality score of a platform identity on its own.
#[must_use]
pub fn score_identity(identity: &AuthIdentity) -> QualityReport {
    if let Err(err) = validate_identity(identity) {
        return quality_failure(&err);
    }
    completeness(
        identity.email.as_deref(),
        identity.email_confirmed_at.is_some(),
        identity.metadata_str(keys::USERNAME),
        identity.metadata_str(keys::FULL_NAME),
        identity.metadata_str(keys::AVATAR_URL),
    )
}

/// Data-quality score of a relational profile on its own.
#[must_use]
pub fn score_profile(profile: &UserProfile) -> QualityReport {
    if let Err(err) = validate_profile(profile) {
        return quality_failure(&err);
    }
    completeness(
        profile.email.as_deref(),
        profile.is_email_verified,
        Some(profile.username.as_str()),
        profile.full_name.as_deref(),
        profile.avatar_url.as_deref(),
    )
}
