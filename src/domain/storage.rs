//! Per-backend outcomes and the aggregated dual-write result.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Store A: the relational store behind the ORM.
    #[serde(rename = "storeA")]
    Relational,
    /// Store B: the backend-as-a-service platform that also owns auth.
    #[serde(rename = "storeB")]
    Platform,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Relational, Backend::Platform];

    /// Stable name used in logs and command output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::Platform => "platform",
        }
    }

    /// Wire key used in serialized results (`storeA` / `storeB`).
    #[must_use]
    pub const fn store_key(self) -> &'static str {
        match self {
            Self::Relational => "storeA",
            Self::Platform => "storeB",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a backend was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    CircuitOpen,
    Disabled,
}

/// Outcome of one backend's part of a dual write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendOutcome {
    pub attempted: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl BackendOutcome {
    #[must_use]
    pub fn succeeded(timing_ms: u64) -> Self {
        Self {
            attempted: true,
            success: true,
            error: None,
            timing_ms: Some(timing_ms),
            skipped: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>, timing_ms: u64) -> Self {
        Self {
            attempted: true,
            success: false,
            error: Some(error.into()),
            timing_ms: Some(timing_ms),
            skipped: None,
        }
    }

    /// Not attempted; no timing is recorded.
    #[must_use]
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            attempted: false,
            success: false,
            error: None,
            timing_ms: None,
            skipped: Some(reason),
        }
    }

    /// Reason to show for an unsuccessful outcome.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match (&self.error, self.skipped) {
            (Some(err), _) => err.clone(),
            (None, Some(SkipReason::CircuitOpen)) => "circuit open, write skipped".to_string(),
            (None, Some(SkipReason::Disabled)) => "backend disabled, write skipped".to_string(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

/// Per-backend outcome pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDetails {
    #[serde(rename = "storeA")]
    pub relational: BackendOutcome,
    #[serde(rename = "storeB")]
    pub platform: BackendOutcome,
}

impl StorageDetails {
    #[must_use]
    pub fn get(&self, backend: Backend) -> &BackendOutcome {
        match backend {
            Backend::Relational => &self.relational,
            Backend::Platform => &self.platform,
        }
    }
}

/// How many backends confirmed a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    Full,
    Partial,
    Failed,
}

impl Consistency {
    /// Classify from the two per-backend outcomes.
    ///
    /// `Full` needs both attempted and succeeded; an outcome that was never
    /// attempted never counts as a success.
    #[must_use]
    pub fn classify(relational: &BackendOutcome, platform: &BackendOutcome) -> Self {
        let ok = |o: &BackendOutcome| o.attempted && o.success;
        match (ok(relational), ok(platform)) {
            (true, true) => Self::Full,
            (true, false) | (false, true) => Self::Partial,
            (false, false) => Self::Failed,
        }
    }

    /// A write counts as committed unless every backend failed.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Standing health of the pair at the time of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegradationMode {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "storeB-disabled")]
    StoreBDisabled,
    #[serde(rename = "storeA-circuit-open")]
    StoreACircuitOpen,
    #[serde(rename = "storeB-circuit-open")]
    StoreBCircuitOpen,
}

/// Result of one logical dual write. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualStorageResult {
    pub id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub details: StorageDetails,
    pub consistency: Consistency,
    pub degradation_mode: DegradationMode,
    pub timestamp: DateTime<Utc>,
    pub total_time_ms: u64,
}

impl DualStorageResult {
    /// Assemble a result, deriving consistency, success and error.
    #[must_use]
    pub fn from_outcomes(
        id: Uuid,
        relational: BackendOutcome,
        platform: BackendOutcome,
        degradation_mode: DegradationMode,
        total_time_ms: u64,
    ) -> Self {
        let consistency = Consistency::classify(&relational, &platform);
        let error = (consistency == Consistency::Failed).then(|| {
            format!(
                "all backends failed: {}: {}; {}: {}",
                Backend::Relational,
                relational.failure_reason(),
                Backend::Platform,
                platform.failure_reason()
            )
        });
        Self {
            id,
            success: consistency.is_committed(),
            error,
            details: StorageDetails {
                relational,
                platform,
            },
            consistency,
            degradation_mode,
            timestamp: Utc::now(),
            total_time_ms,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.consistency != Consistency::Full
    }
}

/// Externally reported status of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Healthy,
    /// Only produced by health checks, never by the write path.
    Degraded,
    Failed,
}

impl StoreStatus {
    /// Status implied by a write outcome.
    #[must_use]
    pub fn from_outcome(outcome: &BackendOutcome) -> Self {
        if outcome.attempted && outcome.success {
            Self::Healthy
        } else {
            Self::Failed
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
        }
    }
}

/// Status pair keyed `storeA` / `storeB` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStatus {
    #[serde(rename = "storeA")]
    pub relational: StoreStatus,
    #[serde(rename = "storeB")]
    pub platform: StoreStatus,
}

impl StorageStatus {
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            relational: StoreStatus::Healthy,
            platform: StoreStatus::Healthy,
        }
    }

    #[must_use]
    pub fn from_details(details: &StorageDetails) -> Self {
        Self {
            relational: StoreStatus::from_outcome(&details.relational),
            platform: StoreStatus::from_outcome(&details.platform),
        }
    }

    #[must_use]
    pub fn get(&self, backend: Backend) -> StoreStatus {
        match backend {
            Backend::Relational => self.relational,
            Backend::Platform => self.platform,
        }
    }
}
