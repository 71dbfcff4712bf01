//! Handlers for the `sync` and `reconcile` commands.

use std::path::Path;

use super::output;
use crate::application::envelope::ALL_BACKENDS_FAILED;
use crate::application::{IdentitySync, WriteContext};
use crate::domain::{AuthIdentity, Backend, UserId};
use crate::error::{Result, StorageError};

/// Read a platform identity from a JSON file.
pub(crate) fn read_identity(path: &Path) -> Result<AuthIdentity> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Sync one identity and print the resulting envelope.
pub async fn execute_sync(sync: &IdentitySync, service: &str, path: &Path) -> Result<()> {
    let identity = read_identity(path)?;
    let ctx = WriteContext::new(service);
    let outcome = sync.sync(&ctx, &identity).await?;
    let envelope = outcome.envelope();

    if output::is_json() {
        output::json_output(&envelope)?;
    } else {
        output::section("Identity Sync");
        output::field("User", outcome.profile.id);
        output::field("Username", &outcome.profile.username);
        output::field("Consistency", format!("{:?}", outcome.result.consistency).to_lowercase());
        output::field("Contract score", outcome.report.score);
        for backend in Backend::ALL {
            output::field(
                backend.store_key(),
                output::store_status(envelope.storage_status.get(backend)),
            );
        }
        for warning in &envelope.warnings {
            output::warning(warning);
        }
        if envelope.success {
            output::success("Profile written");
        }
    }

    if !envelope.success {
        let reason = envelope
            .error
            .unwrap_or_else(|| ALL_BACKENDS_FAILED.to_string());
        return Err(StorageError::AllFailed(reason).into());
    }
    Ok(())
}

/// Compare both backends' view of one user.
pub async fn execute_reconcile(sync: &IdentitySync, service: &str, user_id: &str) -> Result<()> {
    let id = UserId::parse(user_id)?;
    let report = sync.reconcile(&WriteContext::new(service), &id).await?;

    if output::is_json() {
        output::json_output(&report)?;
    } else {
        output::section("Reconcile");
        output::field("User", id);
        output::field("Profile", presence(report.profile.is_some()));
        output::field("Identity", presence(report.identity.is_some()));
        if let Some(contract) = &report.contract {
            output::field("Contract score", contract.score);
            for violation in &contract.violations {
                output::warning(&violation.to_string());
            }
        }
        if report.is_consistent() {
            output::success("Backends agree");
        } else {
            output::warning("Backends disagree");
        }
    }
    Ok(())
}

fn presence(found: bool) -> &'static str {
    if found {
        "present"
    } else {
        "missing"
    }
}
