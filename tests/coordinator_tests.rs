//! Dual-write coordinator integration tests.

mod support;

use std::sync::Arc;
use std::time::Duration;

use dualstore::application::envelope;
use dualstore::application::WriteContext;
use dualstore::domain::{
    Backend, CircuitState, Consistency, DegradationMode, Record, RecordKey, StorageStatus,
    StoreStatus,
};
use dualstore::testkit::{config, domain};
use support::assertions::{assert_consistency, assert_skipped};
use support::pair::Pair;
use tokio_test::assert_ok;

fn user_record() -> Record {
    Record::User(domain::profile("ada"))
}

#[tokio::test]
async fn both_backends_succeed_is_full() {
    let pair = Pair::standard();
    pair.relational.set_latency(Duration::from_millis(50));
    pair.platform.set_latency(Duration::from_millis(80));

    let record = user_record();
    let result = pair.coordinator.write(&WriteContext::default(), &record).await;

    assert_consistency(&result, Consistency::Full);
    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.degradation_mode, DegradationMode::None);
    assert!(result.details.relational.timing_ms.is_some_and(|ms| ms >= 50));
    assert!(result.details.platform.timing_ms.is_some_and(|ms| ms >= 80));

    let env = envelope::from_result((), &result);
    assert!(env.success);
    assert!(!env.degraded);
    assert!(env.warnings.is_empty());
    assert_eq!(env.storage_status, StorageStatus::healthy());

    assert!(pair.relational.stored(&record.key()).is_some());
    assert!(pair.platform.stored(&record.key()).is_some());
}

#[tokio::test]
async fn backends_are_written_concurrently() {
    let pair = Pair::standard();
    pair.relational.set_latency(Duration::from_millis(150));
    pair.platform.set_latency(Duration::from_millis(150));

    let result = pair
        .coordinator
        .write(&WriteContext::default(), &user_record())
        .await;

    assert_consistency(&result, Consistency::Full);
    assert!(
        result.total_time_ms < 290,
        "writes ran sequentially: {}ms",
        result.total_time_ms
    );
}

#[tokio::test]
async fn open_platform_breaker_skips_platform() {
    let pair = Pair::standard();
    let ctx = WriteContext::default();
    let breaker = pair.breakers.breaker(Backend::Platform, &ctx.service);
    for _ in 0..5 {
        breaker.on_failure();
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let result = pair.coordinator.write(&ctx, &user_record()).await;

    assert_skipped(&result.details.platform);
    assert_eq!(pair.platform.write_count(), 0);
    assert_consistency(&result, Consistency::Partial);
    assert!(result.success);
    assert_eq!(result.degradation_mode, DegradationMode::StoreBCircuitOpen);

    let env = envelope::from_result((), &result);
    assert!(env.success);
    assert!(env.degraded);
    assert_eq!(env.warnings.len(), 1);
    assert!(env.warnings[0].starts_with("Platform store (storeB) write failed"));
    assert_eq!(env.storage_status.platform, StoreStatus::Failed);
}

#[tokio::test]
async fn both_backends_failing_is_failed() {
    let pair = Pair::standard();
    pair.relational.fail_with("database is locked");
    pair.platform.fail_with("HTTP 503");

    let result = pair
        .coordinator
        .write(&WriteContext::default(), &user_record())
        .await;

    assert_consistency(&result, Consistency::Failed);
    assert!(!result.success);
    let error = result.error.clone().unwrap_or_default();
    assert!(error.contains("database is locked"), "{error}");
    assert!(error.contains("HTTP 503"), "{error}");

    let env = envelope::from_result((), &result);
    assert!(!env.success);
    assert_eq!(env.storage_status.relational, StoreStatus::Failed);
    assert_eq!(env.storage_status.platform, StoreStatus::Failed);
}

#[tokio::test]
async fn relational_failure_alone_is_partial() {
    let pair = Pair::standard();
    pair.relational.fail_with("disk full");

    let result = pair
        .coordinator
        .write(&WriteContext::default(), &user_record())
        .await;

    assert_consistency(&result, Consistency::Partial);
    assert!(result.success);
    assert!(result.details.relational.attempted);
    assert_eq!(
        result.details.relational.error.as_deref(),
        Some("relational write failed: disk full")
    );
}

#[tokio::test]
async fn threshold_failures_open_the_breaker_and_skip_the_next_call() {
    let pair = Pair::standard();
    pair.platform.fail_with("HTTP 500");
    let ctx = WriteContext::default();

    for _ in 0..5 {
        let result = pair.coordinator.write(&ctx, &user_record()).await;
        assert!(result.details.platform.attempted);
    }
    assert_eq!(pair.platform.write_count(), 5);
    assert!(pair.breakers.breaker(Backend::Platform, &ctx.service).is_open());

    let sixth = pair.coordinator.write(&ctx, &user_record()).await;
    assert_skipped(&sixth.details.platform);
    assert_eq!(pair.platform.write_count(), 5);
    assert_eq!(sixth.degradation_mode, DegradationMode::StoreBCircuitOpen);
}

#[tokio::test]
async fn breaker_recovers_after_open_timeout() {
    let pair = Pair::new(config::breaker(2, 50), config::coordinator(500));
    let ctx = WriteContext::default();
    pair.platform.fail_with("HTTP 500");
    pair.coordinator.write(&ctx, &user_record()).await;
    pair.coordinator.write(&ctx, &user_record()).await;
    assert!(pair.breakers.breaker(Backend::Platform, &ctx.service).is_open());

    pair.platform.recover();
    tokio::time::sleep(Duration::from_millis(80)).await;

    let probe = pair.coordinator.write(&ctx, &user_record()).await;
    assert_consistency(&probe, Consistency::Full);
    let breaker = pair.breakers.breaker(Backend::Platform, &ctx.service);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);
}

#[tokio::test]
async fn slow_backend_times_out_and_counts_as_failure() {
    let pair = Pair::new(config::breaker(5, 60_000), config::coordinator(50));
    pair.platform.set_latency(Duration::from_millis(500));
    let ctx = WriteContext::default();

    let result = pair.coordinator.write(&ctx, &user_record()).await;

    assert_consistency(&result, Consistency::Partial);
    assert!(result.details.platform.attempted);
    assert_eq!(result.details.platform.error.as_deref(), Some("timeout"));
    assert!(result.total_time_ms < 400);
    assert_eq!(
        pair.breakers
            .breaker(Backend::Platform, &ctx.service)
            .failure_count(),
        1
    );
}

#[tokio::test]
async fn caller_deadline_overrides_default_timeout() {
    let pair = Pair::new(config::breaker(5, 60_000), config::coordinator(10_000));
    pair.relational.set_latency(Duration::from_millis(300));
    let ctx = WriteContext::default().with_timeout(Duration::from_millis(30));

    let result = pair.coordinator.write(&ctx, &user_record()).await;

    assert_eq!(result.details.relational.error.as_deref(), Some("timeout"));
    assert!(result.details.platform.success);
}

#[tokio::test]
async fn disabled_platform_is_never_called() {
    let pair = Pair::new(config::breaker(5, 60_000), config::platform_disabled());

    let result = pair
        .coordinator
        .write(&WriteContext::default(), &user_record())
        .await;

    assert_eq!(pair.platform.write_count(), 0);
    assert_skipped(&result.details.platform);
    assert_eq!(result.degradation_mode, DegradationMode::StoreBDisabled);
    assert_consistency(&result, Consistency::Partial);
    assert_eq!(
        result.details.platform.failure_reason(),
        "backend disabled, write skipped"
    );
}

#[tokio::test]
async fn degradation_mode_reflects_standing_health() {
    let pair = Pair::standard();
    let ctx = WriteContext::default();
    let relational = pair.breakers.breaker(Backend::Relational, &ctx.service);
    for _ in 0..5 {
        relational.on_failure();
    }

    assert_eq!(
        pair.coordinator.degradation_mode(&ctx.service),
        DegradationMode::StoreACircuitOpen
    );
    // Another service has its own breakers.
    assert_eq!(
        pair.coordinator.degradation_mode("billing"),
        DegradationMode::None
    );

    let result = pair.coordinator.write(&ctx, &user_record()).await;
    assert_skipped(&result.details.relational);
    assert_eq!(result.degradation_mode, DegradationMode::StoreACircuitOpen);
    assert_eq!(pair.relational.write_count(), 0);
}

#[tokio::test]
async fn concurrent_failures_open_the_breaker() {
    let pair = Arc::new(Pair::new(config::breaker(5, 60_000), config::coordinator(500)));
    pair.platform.fail_with("HTTP 502");

    let mut handles = Vec::new();
    for _ in 0..20 {
        let pair = Arc::clone(&pair);
        handles.push(tokio::spawn(async move {
            pair.coordinator
                .write(&WriteContext::default(), &user_record())
                .await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.success);
    }

    let breaker = pair.breakers.breaker(Backend::Platform, "default");
    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(pair.platform.write_count() >= 5);
    assert_eq!(pair.relational.write_count(), 20);
}

#[tokio::test]
async fn read_falls_back_to_platform() {
    let pair = Pair::standard();
    let doc = domain::document("stories");
    pair.platform.insert(Record::Document(doc.clone()));
    let key = RecordKey::Document {
        collection: "stories".into(),
        id: doc.id,
    };

    let found = assert_ok!(pair.coordinator.read(&WriteContext::default(), &key).await);
    assert_eq!(found, Some(Record::Document(doc)));
    assert_eq!(pair.relational.read_count(), 1);
    assert_eq!(pair.platform.read_count(), 1);
}

#[tokio::test]
async fn read_prefers_relational() {
    let pair = Pair::standard();
    let record = user_record();
    pair.relational.insert(record.clone());

    let found = assert_ok!(
        pair.coordinator
            .read(&WriteContext::default(), &record.key())
            .await
    );
    assert_eq!(found, Some(record));
    assert_eq!(pair.platform.read_count(), 0);
}

#[tokio::test]
async fn read_errors_only_when_no_backend_answers() {
    let pair = Pair::standard();
    let key = user_record().key();
    pair.relational.fail_with("locked");

    let missing = assert_ok!(pair.coordinator.read(&WriteContext::default(), &key).await);
    assert!(missing.is_none());

    pair.platform.fail_with("HTTP 500");
    assert!(pair
        .coordinator
        .read(&WriteContext::default(), &key)
        .await
        .is_err());
}

#[tokio::test]
async fn health_reports_each_backend() {
    let pair = Pair::standard();
    assert_eq!(pair.coordinator.health("default").await, StorageStatus::healthy());

    pair.platform.set_healthy(false);
    let status = pair.coordinator.health("default").await;
    assert_eq!(status.relational, StoreStatus::Healthy);
    assert_eq!(status.platform, StoreStatus::Degraded);

    let breaker = pair.breakers.breaker(Backend::Relational, "default");
    for _ in 0..5 {
        breaker.on_failure();
    }
    let status = pair.coordinator.health("default").await;
    assert_eq!(status.relational, StoreStatus::Failed);
}

#[tokio::test]
async fn result_serializes_with_wire_names() {
    let pair = Pair::new(config::breaker(5, 60_000), config::platform_disabled());
    let result = pair
        .coordinator
        .write(&WriteContext::default(), &user_record())
        .await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["consistency"], "partial");
    assert_eq!(value["degradationMode"], "storeB-disabled");
    assert_eq!(value["details"]["storeA"]["attempted"], true);
    assert_eq!(value["details"]["storeB"]["attempted"], false);
    assert!(value.get("totalTimeMs").is_some());
}
