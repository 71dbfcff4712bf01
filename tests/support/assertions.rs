use dualstore::domain::{BackendOutcome, Consistency, DualStorageResult};

pub fn assert_consistency(result: &DualStorageResult, expected: Consistency) {
    assert_eq!(
        result.consistency, expected,
        "expected {expected:?}, got {:?} (storeA: {:?}, storeB: {:?})",
        result.consistency, result.details.relational, result.details.platform
    );
}

pub fn assert_skipped(outcome: &BackendOutcome) {
    assert!(!outcome.attempted, "expected skip, got {outcome:?}");
    assert!(!outcome.success);
    assert!(outcome.timing_ms.is_none());
}
