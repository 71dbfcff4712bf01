//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  coordinator, contract  │
//!                    └────────────┬────────────┘
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!          ┌─────────────┐                 ┌─────────────┐
//!          │ Relational  │                 │  Platform   │
//!          │  (Store A)  │                 │  (Store B)  │
//!          └─────────────┘                 └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`outbound::storage::StorageBackend`] - write/read/health for one backend
//! - [`outbound::storage::IdentityDirectory`] - authoritative identity lookup

pub mod outbound;
