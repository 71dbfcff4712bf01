//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`backend`] - Scripted [`StorageBackend`](crate::port::outbound::storage::StorageBackend)
//!   and [`IdentityDirectory`](crate::port::outbound::storage::IdentityDirectory) doubles.
//! - [`domain`] - Builders for identities, profiles and documents.
//! - [`config`] - Canonical test configurations (fast breakers, short timeouts).

pub mod backend;
pub mod config;
pub mod domain;
