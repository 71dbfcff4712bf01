//! Identity sync and reconcile integration tests.

mod support;

use std::time::Duration;

use dualstore::application::WriteContext;
use dualstore::domain::{Backend, Consistency, Record, RecordKey, UserId};
use dualstore::error::{Error, StorageError};
use dualstore::testkit::backend::StaticDirectory;
use dualstore::testkit::{config, domain};
use support::pair::Pair;

#[tokio::test]
async fn malformed_identity_is_rejected_before_any_write() {
    let pair = Pair::standard();
    let sync = pair.identity_sync();
    let mut identity = domain::identity("ada@example.com");
    identity.id = "not-a-uuid".into();

    let err = sync
        .sync(&WriteContext::default(), &identity)
        .await
        .unwrap_err();

    assert!(err.is_schema_violation());
    assert_eq!(pair.relational.write_count(), 0);
    assert_eq!(pair.platform.write_count(), 0);
}

#[tokio::test]
async fn sync_writes_derived_profile_to_both_backends() {
    let pair = Pair::standard();
    let sync = pair.identity_sync();
    let identity = domain::identity("ada@example.com");

    let outcome = sync.sync(&WriteContext::default(), &identity).await.unwrap();

    assert_eq!(outcome.result.consistency, Consistency::Full);
    assert_eq!(outcome.report.score, 100);
    assert_eq!(outcome.profile.username, "ada");
    let key = RecordKey::User(outcome.profile.id);
    assert_eq!(
        pair.relational.stored(&key),
        Some(Record::User(outcome.profile.clone()))
    );

    let envelope = outcome.envelope();
    assert!(envelope.success);
    assert!(!envelope.degraded);
    assert_eq!(envelope.data.map(|p| p.id), Some(outcome.profile.id));
}

#[tokio::test]
async fn sync_degrades_when_platform_fails() {
    let pair = Pair::standard();
    pair.platform.fail_with("HTTP 503");
    let sync = pair.identity_sync();

    let outcome = sync
        .sync(&WriteContext::default(), &domain::identity("ada@example.com"))
        .await
        .unwrap();

    let envelope = outcome.envelope();
    assert!(envelope.success);
    assert!(envelope.degraded);
    assert_eq!(
        envelope.warnings,
        vec!["Platform store (storeB) write failed: platform write failed: HTTP 503".to_string()]
    );
}

#[tokio::test]
async fn sync_reports_total_failure_in_envelope() {
    let pair = Pair::standard();
    pair.relational.fail_with("locked");
    pair.platform.fail_with("HTTP 503");
    let sync = pair.identity_sync();

    let outcome = sync
        .sync(&WriteContext::default(), &domain::identity("ada@example.com"))
        .await
        .unwrap();

    let envelope = outcome.envelope();
    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert!(envelope.error.is_some());
}

#[tokio::test]
async fn reconcile_agrees_after_sync() {
    let identity = domain::identity("ada@example.com");
    let pair = Pair::with_directory(
        config::breaker(5, 60_000),
        config::coordinator(500),
        StaticDirectory::new().with_identity(identity.clone()),
    );
    let sync = pair.identity_sync();
    let ctx = WriteContext::default();
    let outcome = sync.sync(&ctx, &identity).await.unwrap();

    let report = sync.reconcile(&ctx, &outcome.profile.id).await.unwrap();
    assert!(report.is_consistent());
    assert!(report.profile.is_some());
    assert!(report.identity.is_some());
    assert_eq!(pair.directory.call_count(), 1);
}

#[tokio::test]
async fn reconcile_flags_diverged_email() {
    let identity = domain::identity("ada@example.com");
    let pair = Pair::with_directory(
        config::breaker(5, 60_000),
        config::coordinator(500),
        StaticDirectory::new().with_identity(identity.clone()),
    );
    let sync = pair.identity_sync();
    let ctx = WriteContext::default();
    let mut outcome = sync.sync(&ctx, &identity).await.unwrap();

    outcome.profile.email = Some("ada@elsewhere.org".into());
    pair.relational.insert(Record::User(outcome.profile.clone()));

    let report = sync.reconcile(&ctx, &outcome.profile.id).await.unwrap();
    assert!(!report.is_consistent());
    let contract = report.contract.unwrap();
    assert_eq!(contract.score, 80);
    assert_eq!(contract.violations[0].field, "email");
}

#[tokio::test]
async fn reconcile_reports_missing_records_without_repairing() {
    let pair = Pair::standard();
    let sync = pair.identity_sync();

    let report = sync
        .reconcile(&WriteContext::default(), &UserId::generate())
        .await
        .unwrap();

    assert!(report.profile.is_none());
    assert!(report.identity.is_none());
    assert!(report.contract.is_none());
    assert!(!report.is_consistent());
    assert_eq!(pair.relational.write_count(), 0);
    assert_eq!(pair.platform.write_count(), 0);
}

#[tokio::test]
async fn reconcile_respects_open_platform_breaker() {
    let pair = Pair::standard();
    let sync = pair.identity_sync();
    let ctx = WriteContext::default();
    let breaker = pair.breakers.breaker(Backend::Platform, &ctx.service);
    for _ in 0..5 {
        breaker.on_failure();
    }

    let err = sync.reconcile(&ctx, &UserId::generate()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Storage(StorageError::Unavailable {
            backend: Backend::Platform
        })
    ));
    assert_eq!(pair.directory.call_count(), 0);
}

#[tokio::test]
async fn reconcile_times_out_on_slow_directory() {
    let directory = StaticDirectory::new();
    directory.set_latency(Duration::from_secs(3600));
    let pair = Pair::with_directory(config::breaker(5, 60_000), config::coordinator(500), directory);
    let sync = pair.identity_sync();
    let ctx = WriteContext::default().with_timeout(Duration::from_millis(100));

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        sync.reconcile(&ctx, &UserId::generate()),
    )
    .await
    .expect("reconcile must honor the caller deadline");

    assert!(matches!(
        result,
        Err(Error::Storage(StorageError::Timeout {
            backend: Backend::Platform
        }))
    ));
    let breaker = pair.breakers.breaker(Backend::Platform, &ctx.service);
    assert_eq!(breaker.failure_count(), 1);
}
