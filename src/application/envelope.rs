//! Builds the standard response envelope from a dual-write result.
//!
//! Warning order is fixed:
//! 1. relational store failed while the platform store succeeded
//! 2. platform store failed while the relational store succeeded
//! 3. every backend failed
//! 4. the explicit error message, if any

use chrono::Utc;

use crate::domain::{
    Backend, Consistency, DualStorageResult, ResponseEnvelope, StorageStatus, ENVELOPE_VERSION,
};

pub const ALL_BACKENDS_FAILED: &str = "All storage backends failed";

fn backend_failure_warning(backend: Backend, reason: &str) -> String {
    match backend {
        Backend::Relational => format!("Relational store (storeA) write failed: {reason}"),
        Backend::Platform => format!("Platform store (storeB) write failed: {reason}"),
    }
}

/// Warnings implied by a result, in the fixed order.
#[must_use]
pub fn warnings_for(result: &DualStorageResult) -> Vec<String> {
    let a = &result.details.relational;
    let b = &result.details.platform;
    let mut warnings = Vec::new();
    if !a.success && b.success {
        warnings.push(backend_failure_warning(
            Backend::Relational,
            &a.failure_reason(),
        ));
    }
    if !b.success && a.success {
        warnings.push(backend_failure_warning(Backend::Platform, &b.failure_reason()));
    }
    if result.consistency == Consistency::Failed {
        warnings.push(ALL_BACKENDS_FAILED.to_string());
    }
    warnings
}

fn envelope<T>(
    success: bool,
    data: Option<T>,
    result: Option<&DualStorageResult>,
    error: Option<String>,
) -> ResponseEnvelope<T> {
    let mut warnings = result.map(warnings_for).unwrap_or_default();
    if let Some(message) = &error {
        warnings.push(message.clone());
    }
    ResponseEnvelope {
        success,
        data,
        degraded: result.is_some_and(DualStorageResult::is_degraded),
        warnings,
        storage_status: result.map_or_else(StorageStatus::healthy, |r| {
            StorageStatus::from_details(&r.details)
        }),
        error,
        timestamp: Utc::now(),
        version: ENVELOPE_VERSION.to_string(),
    }
}

/// Envelope for a completed operation.
///
/// `success` follows the storage result when one is given, so a write that
/// failed on every backend is never reported as a success.
#[must_use]
pub fn build_success<T>(data: T, result: Option<&DualStorageResult>) -> ResponseEnvelope<T> {
    let success = result.map_or(true, |r| r.success);
    envelope(success, Some(data), result, None)
}

/// Envelope for a failed operation. The message is the last warning.
#[must_use]
pub fn build_error<T>(
    message: impl Into<String>,
    result: Option<&DualStorageResult>,
) -> ResponseEnvelope<T> {
    envelope(false, None, result, Some(message.into()))
}

/// Envelope for the outcome of a dual write: success unless every backend
/// failed, in which case the result's error becomes the message.
#[must_use]
pub fn from_result<T>(data: T, result: &DualStorageResult) -> ResponseEnvelope<T> {
    if result.success {
        build_success(data, Some(result))
    } else {
        let message = result
            .error
            .clone()
            .unwrap_or_else(|| ALL_BACKENDS_FAILED.to_string());
        build_error(message, Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BackendOutcome, DegradationMode, SkipReason, StoreStatus};
    use serde_json::json;
    use uuid::Uuid;

    fn result(a: BackendOutcome, b: BackendOutcome) -> DualStorageResult {
        DualStorageResult::from_outcomes(Uuid::nil(), a, b, DegradationMode::None, 10)
    }

    #[test]
    fn full_write_has_no_warnings() {
        let r = result(BackendOutcome::succeeded(50), BackendOutcome::succeeded(80));
        let env = build_success(json!({ "ok": true }), Some(&r));
        assert!(env.success);
        assert!(!env.degraded);
        assert!(env.warnings.is_empty());
        assert_eq!(env.storage_status, StorageStatus::healthy());
        assert_eq!(env.version, "1.0");
    }

    #[test]
    fn platform_skip_warns_once() {
        let r = result(
            BackendOutcome::succeeded(5),
            BackendOutcome::skipped(SkipReason::CircuitOpen),
        );
        let env = build_success((), Some(&r));
        assert!(env.success);
        assert!(env.degraded);
        assert_eq!(
            env.warnings,
            vec!["Platform store (storeB) write failed: circuit open, write skipped".to_string()]
        );
        assert_eq!(env.storage_status.platform, StoreStatus::Failed);
        assert_eq!(env.storage_status.relational, StoreStatus::Healthy);
    }

    #[test]
    fn relational_failure_warns_with_reason() {
        let r = result(
            BackendOutcome::failed("database is locked", 3),
            BackendOutcome::succeeded(20),
        );
        let env = build_success((), Some(&r));
        assert_eq!(
            env.warnings,
            vec!["Relational store (storeA) write failed: database is locked".to_string()]
        );
    }

    #[test]
    fn total_failure_orders_generic_then_explicit() {
        let r = result(
            BackendOutcome::failed("a", 1),
            BackendOutcome::failed("b", 1),
        );
        let env: ResponseEnvelope<()> = build_error("could not save story", Some(&r));
        assert!(!env.success);
        assert!(env.degraded);
        assert_eq!(
            env.warnings,
            vec![
                ALL_BACKENDS_FAILED.to_string(),
                "could not save story".to_string()
            ]
        );
        assert_eq!(env.storage_status.relational, StoreStatus::Failed);
        assert_eq!(env.storage_status.platform, StoreStatus::Failed);
        assert_eq!(env.error.as_deref(), Some("could not save story"));
    }

    #[test]
    fn build_success_reflects_failed_result() {
        let r = result(
            BackendOutcome::failed("a", 1),
            BackendOutcome::failed("b", 1),
        );
        assert!(!build_success((), Some(&r)).success);
        assert!(!from_result((), &r).success);
    }

    #[test]
    fn no_result_means_healthy_and_not_degraded() {
        let env = build_success(1, None);
        assert!(env.success);
        assert!(!env.degraded);
        assert!(env.warnings.is_empty());
        assert_eq!(env.storage_status, StorageStatus::healthy());

        let env: ResponseEnvelope<i32> = build_error("bad input", None);
        assert!(!env.success);
        assert_eq!(env.warnings, vec!["bad input".to_string()]);
    }

    #[test]
    fn serializes_contract_field_names() {
        let r = result(BackendOutcome::succeeded(1), BackendOutcome::succeeded(1));
        let value = serde_json::to_value(build_success(json!({ "id": 1 }), Some(&r))).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "success",
            "data",
            "degraded",
            "warnings",
            "storageStatus",
            "timestamp",
            "version",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("error"));
        assert_eq!(value["storageStatus"]["storeA"], json!("healthy"));
        assert_eq!(value["version"], json!("1.0"));
    }
}
