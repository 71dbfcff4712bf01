//! Canonical test configurations.
//!
//! Single source of truth for breaker and coordinator settings used across
//! tests.

use std::time::Duration;

use crate::application::{BreakerPolicy, CoordinatorOptions};

/// Breaker that trips after `threshold` failures and probes after `open_ms`.
pub fn breaker(threshold: u32, open_ms: u64) -> BreakerPolicy {
    BreakerPolicy {
        failure_threshold: threshold,
        open_timeout: Duration::from_millis(open_ms),
    }
}

/// Coordinator with a short write timeout and both backends enabled.
pub fn coordinator(write_timeout_ms: u64) -> CoordinatorOptions {
    CoordinatorOptions {
        write_timeout: Duration::from_millis(write_timeout_ms),
        platform_enabled: true,
    }
}

/// Coordinator with the platform backend switched off.
pub fn platform_disabled() -> CoordinatorOptions {
    CoordinatorOptions {
        platform_enabled: false,
        ..CoordinatorOptions::default()
    }
}
