//! Breaker and coordinator configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::{BreakerPolicy, CoordinatorOptions};

/// Circuit breaker thresholds (`[breaker]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures before a breaker opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Time an open breaker waits before admitting a probe (milliseconds).
    #[serde(default = "default_open_timeout_ms")]
    pub open_timeout_ms: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_open_timeout_ms() -> u64 {
    60_000 // 1 minute
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_timeout_ms: default_open_timeout_ms(),
        }
    }
}

impl From<BreakerConfig> for BreakerPolicy {
    fn from(config: BreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold,
            open_timeout: Duration::from_millis(config.open_timeout_ms),
        }
    }
}

/// Dual-write coordinator settings (`[coordinator]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CoordinatorConfig {
    /// Bound on each backend call when the caller sets no deadline.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

const fn default_write_timeout_ms() -> u64 {
    10_000
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout_ms(),
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn options(&self, platform_enabled: bool) -> CoordinatorOptions {
        CoordinatorOptions {
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            platform_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_config_converts_to_policy() {
        let policy = BreakerPolicy::from(BreakerConfig {
            failure_threshold: 3,
            open_timeout_ms: 1500,
        });
        assert_eq!(policy.failure_threshold, 3);
        assert_eq!(policy.open_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn defaults_match_policy_defaults() {
        assert_eq!(BreakerPolicy::from(BreakerConfig::default()), BreakerPolicy::default());
        assert_eq!(
            CoordinatorConfig::default().options(true),
            CoordinatorOptions::default()
        );
    }
}
