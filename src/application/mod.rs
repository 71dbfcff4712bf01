//! Application layer: resilience, identity contract, and dual-write services.

pub mod contract;
pub mod coordinator;
pub mod envelope;
pub mod identity;
pub mod resilience;

pub use coordinator::{CoordinatorOptions, DualWriteCoordinator, WriteContext, DEFAULT_SERVICE};
pub use identity::{IdentitySync, ReconcileReport, SyncOutcome};
pub use resilience::{BreakerPolicy, BreakerRegistry, CircuitBreaker};
