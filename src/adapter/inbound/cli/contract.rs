//! Offline handlers: `validate` and `transform`.

use std::path::Path;

use serde_json::json;

use super::identity::read_identity;
use super::output;
use crate::application::contract::{
    score_identity, score_profile, transform_b_to_a, validate_sync_contract, ContractSubject,
    SyncDirection,
};
use crate::domain::{ContractError, UserProfile};
use crate::error::Result;

fn read_profile(path: &Path) -> Result<UserProfile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Score an identity and a profile against the sync contract.
///
/// Fails when the pair violates the contract.
pub fn execute_validate(identity_path: &Path, profile_path: &Path) -> Result<()> {
    let identity = read_identity(identity_path)?;
    let profile = read_profile(profile_path)?;

    let report = validate_sync_contract(
        SyncDirection::PlatformToRelational,
        ContractSubject::Identity(&identity),
        ContractSubject::Profile(&profile),
    );
    let identity_quality = score_identity(&identity);
    let profile_quality = score_profile(&profile);

    if output::is_json() {
        output::json_output(&json!({
            "command": "validate",
            "contract": report,
            "quality": {
                "identity": identity_quality,
                "profile": profile_quality,
            },
        }))?;
    } else {
        output::section("Sync Contract");
        output::field("Score", report.score);
        output::field("Identity quality", identity_quality.score);
        output::field("Profile quality", profile_quality.score);
        for violation in &report.violations {
            output::warning(&violation.to_string());
        }
        if report.is_valid {
            output::success("Records satisfy the contract");
        }
    }

    if report.is_valid {
        Ok(())
    } else {
        let field = report.violations.first().map_or("record", |v| v.field);
        Err(ContractError::violation(field, format!("contract score {}", report.score)).into())
    }
}

/// Print the relational profile derived from a platform identity.
pub fn execute_transform(identity_path: &Path) -> Result<()> {
    let identity = read_identity(identity_path)?;
    let profile = transform_b_to_a(&identity)?;

    if output::is_json() {
        output::json_output(&profile)?;
    } else {
        output::section("Derived Profile");
        output::field("Id", profile.id);
        output::field("Username", &profile.username);
        output::field("Email", profile.email.as_deref().unwrap_or("-"));
        output::field("Full name", profile.full_name.as_deref().unwrap_or("-"));
        output::field("Role", profile.role);
        output::field("Verified", profile.is_email_verified);
        let quality = score_profile(&profile);
        output::field("Quality", quality.score);
        for violation in &quality.violations {
            output::note(&violation.to_string());
        }
    }
    Ok(())
}
