//! Outbound adapters (driven side).

pub mod platform;
pub mod sqlite;
