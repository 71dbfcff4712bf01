//! Per-backend circuit breaker.
//!
//! A lazily evaluated state machine: there is no background timer, every
//! transition happens inside a call. The mutex serializes failure counting
//! and the CLOSED → OPEN transition between concurrent writers.
//!
//! ```text
//! Closed   → Open:     failure_count >= failure_threshold
//! Open     → HalfOpen: can_execute() after open_timeout elapsed
//! HalfOpen → Closed:   on_success()
//! HalfOpen → Open:     on_failure()
//! ```
//!
//! Several callers arriving together after the timeout may all be admitted
//! as probes. The worst case is one extra failed probe.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::{Backend, BreakerSnapshot, CircuitState};

/// Thresholds for one breaker. Fixed for the breaker's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerPolicy {
    /// Consecutive failures that trip the breaker.
    pub failure_threshold: u32,
    /// How long an open breaker skips calls before admitting a probe.
    pub open_timeout: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding one backend for one logical service.
#[derive(Debug)]
pub struct CircuitBreaker {
    backend: Backend,
    service: String,
    policy: BreakerPolicy,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(backend: Backend, service: impl Into<String>, policy: BreakerPolicy) -> Self {
        Self {
            backend,
            service: service.into(),
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn policy(&self) -> BreakerPolicy {
        self.policy
    }

    /// Whether a call may proceed now.
    pub fn can_execute(&self) -> bool {
        self.can_execute_at(Instant::now())
    }

    /// Whether a call may proceed at `now`.
    ///
    /// An open breaker whose timeout has elapsed moves to half-open and
    /// admits the call as a probe.
    pub fn can_execute_at(&self, now: Instant) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map_or(self.policy.open_timeout, |at| now.saturating_duration_since(at));
                if elapsed >= self.policy.open_timeout {
                    inner.state = CircuitState::HalfOpen;
                    info!(
                        backend = %self.backend,
                        service = %self.service,
                        "Circuit breaker half-open, admitting probe"
                    );
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call. Closes the breaker and clears the count.
    pub fn on_success(&self) {
        let mut inner = self.inner.lock();
        let previous = inner.state;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        if previous != CircuitState::Closed {
            info!(
                backend = %self.backend,
                service = %self.service,
                from = %previous,
                "Circuit breaker closed"
            );
        }
    }

    /// Record a failed call.
    pub fn on_failure(&self) {
        self.on_failure_at(Instant::now());
    }

    /// Record a failed call at `now`.
    pub fn on_failure_at(&self, now: Instant) {
        let mut inner = self.inner.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = Some(now);

        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                warn!(
                    backend = %self.backend,
                    service = %self.service,
                    "Circuit breaker probe failed, reopening"
                );
            }
            CircuitState::Closed if inner.failure_count >= self.policy.failure_threshold => {
                inner.state = CircuitState::Open;
                warn!(
                    backend = %self.backend,
                    service = %self.service,
                    failures = inner.failure_count,
                    open_timeout_ms = self.policy.open_timeout.as_millis() as u64,
                    "Circuit breaker tripped"
                );
            }
            _ => {}
        }
    }

    /// Current raw state, without evaluating the open timeout.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    /// Administrative reset back to a fresh closed breaker.
    pub fn reset(&self) {
        *self.inner.lock() = Inner::default();
        info!(
            backend = %self.backend,
            service = %self.service,
            "Circuit breaker reset"
        );
    }

    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        self.snapshot_at(Instant::now())
    }

    #[must_use]
    pub fn snapshot_at(&self, now: Instant) -> BreakerSnapshot {
        let inner = self.inner.lock();
        let since = inner
            .last_failure
            .map(|at| now.saturating_duration_since(at));
        let retry_in = match (inner.state, since) {
            (CircuitState::Open, Some(since)) => {
                Some(self.policy.open_timeout.saturating_sub(since).as_millis() as u64)
            }
            _ => None,
        };
        BreakerSnapshot {
            backend: self.backend,
            service: self.service.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            failure_threshold: self.policy.failure_threshold,
            since_last_failure_ms: since.map(|d| d.as_millis() as u64),
            retry_in_ms: retry_in,
        }
    }
}
