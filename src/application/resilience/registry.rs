//! Breakers keyed by backend and logical service name.

use std::sync::Arc;

use dashmap::DashMap;

use super::breaker::{BreakerPolicy, CircuitBreaker};
use crate::domain::{Backend, BreakerSnapshot};

/// Owns every circuit breaker in the process.
///
/// Construct once at startup and share by reference. Breakers are created
/// on first lookup and live as long as the registry.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    policy: BreakerPolicy,
    breakers: DashMap<(Backend, String), Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    #[must_use]
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            policy,
            breakers: DashMap::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> BreakerPolicy {
        self.policy
    }

    /// The breaker for `(backend, service)`, created if absent.
    pub fn breaker(&self, backend: Backend, service: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(&(backend, service.to_string())) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .breakers
            .entry((backend, service.to_string()))
            .or_insert_with(|| Arc::new(CircuitBreaker::new(backend, service, self.policy)));
        Arc::clone(entry.value())
    }

    /// The breaker for `(backend, service)` if it has been created.
    #[must_use]
    pub fn get(&self, backend: Backend, service: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers
            .get(&(backend, service.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Reset one breaker. Returns false when it does not exist.
    pub fn reset(&self, backend: Backend, service: &str) -> bool {
        match self.get(backend, service) {
            Some(breaker) => {
                breaker.reset();
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }

    /// Snapshots of every breaker, ordered by service then backend.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snaps: Vec<_> = self
            .breakers
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        snaps.sort_by(|a, b| {
            a.service
                .cmp(&b.service)
                .then_with(|| a.backend.as_str().cmp(b.backend.as_str()))
        });
        snaps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CircuitState;

    #[test]
    fn same_key_returns_same_breaker() {
        let registry = BreakerRegistry::default();
        let a = registry.breaker(Backend::Relational, "stories");
        let b = registry.breaker(Backend::Relational, "stories");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn breakers_are_isolated_per_backend_and_service() {
        let registry = BreakerRegistry::new(BreakerPolicy {
            failure_threshold: 1,
            ..BreakerPolicy::default()
        });
        registry.breaker(Backend::Platform, "users").on_failure();

        assert!(registry.breaker(Backend::Platform, "users").is_open());
        assert!(!registry.breaker(Backend::Relational, "users").is_open());
        assert!(!registry.breaker(Backend::Platform, "stories").is_open());
    }

    #[test]
    fn reset_only_touches_existing_breakers() {
        let registry = BreakerRegistry::new(BreakerPolicy {
            failure_threshold: 1,
            ..BreakerPolicy::default()
        });
        assert!(!registry.reset(Backend::Platform, "users"));

        registry.breaker(Backend::Platform, "users").on_failure();
        assert!(registry.reset(Backend::Platform, "users"));
        assert_eq!(
            registry.breaker(Backend::Platform, "users").state(),
            CircuitState::Closed
        );
    }

    #[test]
    fn snapshots_are_sorted() {
        let registry = BreakerRegistry::default();
        registry.breaker(Backend::Relational, "users");
        registry.breaker(Backend::Platform, "stories");
        registry.breaker(Backend::Relational, "stories");

        let keys: Vec<_> = registry
            .snapshots()
            .into_iter()
            .map(|s| (s.service, s.backend))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("stories".to_string(), Backend::Platform),
                ("stories".to_string(), Backend::Relational),
                ("users".to_string(), Backend::Relational),
            ]
        );
    }
}
