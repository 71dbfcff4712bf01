//! Identity synchronization between the platform and relational backends.
//!
//! The platform identity is authoritative. Every sign-in or profile update
//! re-derives the relational profile and writes it through the coordinator;
//! the relational row is upserted, never deleted here.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::contract::{
    transform_b_to_a, validate_sync_contract, ContractSubject, SyncDirection, SyncReport,
};
use super::coordinator::{DualWriteCoordinator, WriteContext};
use super::envelope;
use crate::domain::{
    AuthIdentity, Backend, DualStorageResult, Record, RecordKey, ResponseEnvelope, UserId,
    UserProfile,
};
use crate::error::{Result, StorageError};
use crate::port::outbound::storage::IdentityDirectory;

/// Result of syncing one identity.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub profile: UserProfile,
    pub result: DualStorageResult,
    pub report: SyncReport,
}

impl SyncOutcome {
    /// Caller-facing envelope carrying the derived profile.
    #[must_use]
    pub fn envelope(&self) -> ResponseEnvelope<UserProfile> {
        envelope::from_result(self.profile.clone(), &self.result)
    }
}

/// Comparison of what each backend currently holds for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub user_id: UserId,
    pub profile: Option<UserProfile>,
    pub identity: Option<AuthIdentity>,
    /// Present only when both records exist.
    pub contract: Option<SyncReport>,
}

impl ReconcileReport {
    /// True when both records exist and agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.contract.as_ref().is_some_and(|c| c.is_valid)
    }
}

/// Use-case service wiring the identity contract to the dual-write path.
pub struct IdentitySync {
    coordinator: Arc<DualWriteCoordinator>,
    directory: Arc<dyn IdentityDirectory>,
}

impl IdentitySync {
    #[must_use]
    pub fn new(coordinator: Arc<DualWriteCoordinator>, directory: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            coordinator,
            directory,
        }
    }

    #[must_use]
    pub fn coordinator(&self) -> &Arc<DualWriteCoordinator> {
        &self.coordinator
    }

    /// Derive the profile for `identity` and write it to both backends.
    ///
    /// # Errors
    ///
    /// Returns a schema violation when the identity or the derived profile
    /// is malformed. No backend is called in that case.
    pub async fn sync(&self, ctx: &WriteContext, identity: &AuthIdentity) -> Result<SyncOutcome> {
        let profile = transform_b_to_a(identity).map_err(|err| {
            warn!(identity_id = %identity.id, error = %err, "Rejected identity record");
            err
        })?;

        let result = self
            .coordinator
            .write(ctx, &Record::User(profile.clone()))
            .await;

        let report = validate_sync_contract(
            SyncDirection::PlatformToRelational,
            ContractSubject::Identity(identity),
            ContractSubject::Profile(&profile),
        );
        if !report.is_valid {
            warn!(
                user_id = %profile.id,
                score = report.score,
                violations = report.violations.len(),
                "Identity contract violated after sync"
            );
        }

        info!(
            user_id = %profile.id,
            consistency = ?result.consistency,
            score = report.score,
            "Identity synced"
        );

        Ok(SyncOutcome {
            profile,
            result,
            report,
        })
    }

    /// Compare the relational profile with the platform identity.
    ///
    /// Missing records are reported, never repaired.
    ///
    /// # Errors
    ///
    /// Returns an error if either backend cannot be reached.
    pub async fn reconcile(&self, ctx: &WriteContext, id: &UserId) -> Result<ReconcileReport> {
        let profile = match self
            .coordinator
            .read_from(Backend::Relational, ctx, &RecordKey::User(*id))
            .await?
        {
            Some(Record::User(profile)) => Some(profile),
            _ => None,
        };

        let identity = self.fetch_identity(ctx, id).await?;

        let contract = match (&identity, &profile) {
            (Some(identity), Some(profile)) => Some(validate_sync_contract(
                SyncDirection::PlatformToRelational,
                ContractSubject::Identity(identity),
                ContractSubject::Profile(profile),
            )),
            _ => None,
        };

        let report = ReconcileReport {
            user_id: *id,
            profile,
            identity,
            contract,
        };
        if !report.is_consistent() {
            warn!(
                user_id = %id,
                has_profile = report.profile.is_some(),
                has_identity = report.identity.is_some(),
                score = ?report.contract.as_ref().map(|c| c.score),
                "Identity records disagree"
            );
        }
        Ok(report)
    }

    async fn fetch_identity(&self, ctx: &WriteContext, id: &UserId) -> Result<Option<AuthIdentity>> {
        let breaker = self
            .coordinator
            .breakers()
            .breaker(Backend::Platform, &ctx.service);
        if !self.coordinator.options().platform_enabled || !breaker.can_execute() {
            return Err(StorageError::Unavailable {
                backend: Backend::Platform,
            }
            .into());
        }
        let deadline = tokio::time::Instant::from_std(self.coordinator.deadline(ctx));
        match tokio::time::timeout_at(deadline, self.directory.fetch_identity(id)).await {
            Ok(Ok(found)) => {
                breaker.on_success();
                Ok(found)
            }
            Ok(Err(err)) => {
                breaker.on_failure();
                Err(err)
            }
            Err(_) => {
                breaker.on_failure();
                warn!(user_id = %id, "Identity lookup timed out");
                Err(StorageError::Timeout {
                    backend: Backend::Platform,
                }
                .into())
            }
        }
    }
}
