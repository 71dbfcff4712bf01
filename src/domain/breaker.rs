//! Circuit breaker state types.

use std::fmt;

use serde::Serialize;

use super::storage::Backend;

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation; calls pass through.
    #[default]
    Closed,
    /// Too many consecutive failures; calls are skipped until the open
    /// timeout elapses.
    Open,
    /// Open timeout elapsed; the next call probes the backend.
    HalfOpen,
}

impl CircuitState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of one breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    pub backend: Backend,
    pub service: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    /// Milliseconds since the last recorded failure.
    pub since_last_failure_ms: Option<u64>,
    /// Milliseconds until an open breaker admits a probe.
    pub retry_in_ms: Option<u64>,
}
