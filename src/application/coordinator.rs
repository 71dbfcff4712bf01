//! Dual-write coordination across the relational and platform backends.
//!
//! Each logical write makes at most one attempt per backend. Both attempts
//! run concurrently and are joined before the result is classified. A
//! backend whose breaker is open is skipped without being called.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::resilience::{BreakerRegistry, CircuitBreaker};
use crate::domain::{
    Backend, BackendOutcome, Consistency, DegradationMode, DualStorageResult, Record, RecordKey,
    SkipReason, StorageStatus, StoreStatus,
};
use crate::error::{Error, Result, StorageError};
use crate::port::outbound::storage::StorageBackend;

/// Service name used when the caller does not name one.
pub const DEFAULT_SERVICE: &str = "default";

/// Coordinator settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Bound on each adapter call when the caller sets no deadline.
    pub write_timeout: Duration,
    /// When false the platform backend is never called.
    pub platform_enabled: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(10),
            platform_enabled: true,
        }
    }
}

/// Per-call context supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteContext {
    /// Logical service; selects the breaker pair.
    pub service: String,
    /// Absolute deadline for every adapter call in this operation.
    pub deadline: Option<Instant>,
}

impl WriteContext {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for WriteContext {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

/// Orchestrates writes to both backends and classifies the outcome.
pub struct DualWriteCoordinator {
    relational: Arc<dyn StorageBackend>,
    platform: Arc<dyn StorageBackend>,
    breakers: Arc<BreakerRegistry>,
    options: CoordinatorOptions,
}

impl DualWriteCoordinator {
    #[must_use]
    pub fn new(
        relational: Arc<dyn StorageBackend>,
        platform: Arc<dyn StorageBackend>,
        breakers: Arc<BreakerRegistry>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            relational,
            platform,
            breakers,
            options,
        }
    }

    #[must_use]
    pub fn breakers(&self) -> &Arc<BreakerRegistry> {
        &self.breakers
    }

    #[must_use]
    pub fn options(&self) -> CoordinatorOptions {
        self.options
    }

    /// Deadline for one adapter call: the caller's, else now plus the write timeout.
    pub(crate) fn deadline(&self, ctx: &WriteContext) -> Instant {
        ctx.deadline
            .unwrap_or_else(|| Instant::now() + self.options.write_timeout)
    }

    /// Standing health of the pair for `service`, independent of any call.
    #[must_use]
    pub fn degradation_mode(&self, service: &str) -> DegradationMode {
        if !self.options.platform_enabled {
            return DegradationMode::StoreBDisabled;
        }
        if self.breakers.breaker(Backend::Relational, service).is_open() {
            return DegradationMode::StoreACircuitOpen;
        }
        if self.breakers.breaker(Backend::Platform, service).is_open() {
            return DegradationMode::StoreBCircuitOpen;
        }
        DegradationMode::None
    }

    /// Write `record` to both backends.
    ///
    /// Never returns an error: every failure is recorded against the backend
    /// that produced it and reflected in the consistency classification.
    pub async fn write(&self, ctx: &WriteContext, record: &Record) -> DualStorageResult {
        let started = Instant::now();
        let deadline = self.deadline(ctx);
        let mode = self.degradation_mode(&ctx.service);

        let relational_breaker = self.breakers.breaker(Backend::Relational, &ctx.service);
        let platform_breaker = self.breakers.breaker(Backend::Platform, &ctx.service);

        let relational = attempt_write(
            self.relational.as_ref(),
            &relational_breaker,
            record,
            deadline,
        );
        let platform = async {
            if self.options.platform_enabled {
                attempt_write(self.platform.as_ref(), &platform_breaker, record, deadline).await
            } else {
                BackendOutcome::skipped(SkipReason::Disabled)
            }
        };
        let (relational, platform) = tokio::join!(relational, platform);

        let result = DualStorageResult::from_outcomes(
            record.id(),
            relational,
            platform,
            mode,
            elapsed_ms(started),
        );

        match result.consistency {
            Consistency::Full => info!(
                record_id = %result.id,
                kind = record.kind(),
                service = %ctx.service,
                store_a_ms = ?result.details.relational.timing_ms,
                store_b_ms = ?result.details.platform.timing_ms,
                total_ms = result.total_time_ms,
                "Dual write committed"
            ),
            Consistency::Partial => warn!(
                record_id = %result.id,
                kind = record.kind(),
                service = %ctx.service,
                store_a_ok = result.details.relational.success,
                store_b_ok = result.details.platform.success,
                degradation = ?result.degradation_mode,
                total_ms = result.total_time_ms,
                "Dual write partially committed"
            ),
            Consistency::Failed => warn!(
                record_id = %result.id,
                kind = record.kind(),
                service = %ctx.service,
                error = result.error.as_deref().unwrap_or_default(),
                total_ms = result.total_time_ms,
                "Dual write failed on every backend"
            ),
        }

        result
    }

    /// Read a record, preferring the relational backend.
    ///
    /// Falls back to the platform backend when the relational one is
    /// skipped, fails, or has no such record.
    ///
    /// # Errors
    ///
    /// Returns the last backend error when no backend could answer.
    pub async fn read(&self, ctx: &WriteContext, key: &RecordKey) -> Result<Option<Record>> {
        let deadline = self.deadline(ctx);
        let mut answered = false;
        let mut last_error: Option<Error> = None;

        let mut candidates = vec![Backend::Relational];
        if self.options.platform_enabled {
            candidates.push(Backend::Platform);
        }

        for backend in candidates {
            match self.read_until(backend, ctx, key, deadline).await {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => answered = true,
                Err(err) => last_error = Some(err),
            }
        }

        if answered {
            return Ok(None);
        }
        Err(last_error.unwrap_or(Error::Storage(StorageError::Unavailable {
            backend: Backend::Relational,
        })))
    }

    /// Read from one backend only, through its breaker.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the breaker is open, or the
    /// backend's own error.
    pub async fn read_from(
        &self,
        backend: Backend,
        ctx: &WriteContext,
        key: &RecordKey,
    ) -> Result<Option<Record>> {
        self.read_until(backend, ctx, key, self.deadline(ctx)).await
    }

    async fn read_until(
        &self,
        backend: Backend,
        ctx: &WriteContext,
        key: &RecordKey,
        deadline: Instant,
    ) -> Result<Option<Record>> {
        let breaker = self.breakers.breaker(backend, &ctx.service);
        attempt_read(self.adapter(backend), &breaker, key, deadline).await
    }

    /// Health-derived status of both backends for `service`.
    ///
    /// An open breaker reports `failed`; a failing health probe or a
    /// disabled backend reports `degraded`.
    pub async fn health(&self, service: &str) -> StorageStatus {
        let relational = self.probe(Backend::Relational, service);
        let platform = async {
            if self.options.platform_enabled {
                self.probe(Backend::Platform, service).await
            } else {
                StoreStatus::Degraded
            }
        };
        let (relational, platform) = tokio::join!(relational, platform);
        StorageStatus {
            relational,
            platform,
        }
    }

    async fn probe(&self, backend: Backend, service: &str) -> StoreStatus {
        if self.breakers.breaker(backend, service).is_open() {
            return StoreStatus::Failed;
        }
        let healthy = tokio::time::timeout(self.options.write_timeout, self.adapter(backend).health_check())
            .await
            .unwrap_or(false);
        if healthy {
            StoreStatus::Healthy
        } else {
            debug!(backend = %backend, "Health check failed");
            StoreStatus::Degraded
        }
    }

    fn adapter(&self, backend: Backend) -> &dyn StorageBackend {
        match backend {
            Backend::Relational => self.relational.as_ref(),
            Backend::Platform => self.platform.as_ref(),
        }
    }
}

async fn attempt_write(
    adapter: &dyn StorageBackend,
    breaker: &CircuitBreaker,
    record: &Record,
    deadline: Instant,
) -> BackendOutcome {
    let backend = adapter.backend();
    if !breaker.can_execute() {
        debug!(backend = %backend, record_id = %record.id(), "Circuit open, skipping write");
        return BackendOutcome::skipped(SkipReason::CircuitOpen);
    }

    let started = Instant::now();
    let result =
        tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), adapter.write(record))
            .await;
    let timing_ms = elapsed_ms(started);

    match result {
        Ok(Ok(_ack)) => {
            breaker.on_success();
            BackendOutcome::succeeded(timing_ms)
        }
        Ok(Err(err)) => {
            breaker.on_failure();
            warn!(backend = %backend, error = %err, timing_ms, "Backend write failed");
            BackendOutcome::failed(err.to_string(), timing_ms)
        }
        Err(_) => {
            breaker.on_failure();
            let err = StorageError::Timeout { backend };
            warn!(backend = %backend, timing_ms, "Backend write timed out");
            BackendOutcome::failed(err.to_string(), timing_ms)
        }
    }
}

async fn attempt_read(
    adapter: &dyn StorageBackend,
    breaker: &CircuitBreaker,
    key: &RecordKey,
    deadline: Instant,
) -> Result<Option<Record>> {
    let backend = adapter.backend();
    if !breaker.can_execute() {
        return Err(StorageError::Unavailable { backend }.into());
    }
    let result =
        tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), adapter.read(key)).await;
    match result {
        Ok(Ok(found)) => {
            breaker.on_success();
            Ok(found)
        }
        Ok(Err(err)) => {
            breaker.on_failure();
            warn!(backend = %backend, error = %err, "Backend read failed");
            Err(err)
        }
        Err(_) => {
            breaker.on_failure();
            Err(StorageError::Timeout { backend }.into())
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
