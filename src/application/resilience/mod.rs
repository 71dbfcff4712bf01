//! Backend health tracking.

mod breaker;
mod registry;

pub use breaker::{BreakerPolicy, CircuitBreaker};
pub use registry::BreakerRegistry;
