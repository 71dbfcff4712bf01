//! Externally visible response envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::storage::StorageStatus;

/// Envelope version. Consumers depend on this value; keep it stable.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Standard response shape returned to callers of the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub degraded: bool,
    pub warnings: Vec<String>,
    pub storage_status: StorageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl<T> ResponseEnvelope<T> {
    /// Replace the write-derived statuses with health-check statuses.
    #[must_use]
    pub fn with_storage_status(mut self, status: StorageStatus) -> Self {
        self.storage_status = status;
        self
    }

    /// Map the payload, keeping every other field.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            success: self.success,
            data: self.data.map(f),
            degraded: self.degraded,
            warnings: self.warnings,
            storage_status: self.storage_status,
            error: self.error,
            timestamp: self.timestamp,
            version: self.version,
        }
    }
}
