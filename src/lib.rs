//! Dualstore - dual-backend write resilience.
//!
//! Every logical write goes to two independent backends: a relational store
//! (Store A) and a backend-as-a-service platform (Store B). The crate keeps
//! the caller working while either backend is down and reports precisely how
//! consistent each write ended up.
//!
//! # Architecture
//!
//! - **`domain`** - Pure types: records, identities, per-backend outcomes,
//!   consistency levels, the response envelope
//! - **`port`** - The [`StorageBackend`](port::outbound::storage::StorageBackend)
//!   and [`IdentityDirectory`](port::outbound::storage::IdentityDirectory) seams
//! - **`application`** - Circuit breakers, the identity contract, the
//!   dual-write coordinator and the envelope builder
//! - **`adapter`** - SQLite (Diesel) and platform REST (reqwest) backends,
//!   plus the operator CLI
//! - **`infrastructure`** - Configuration, logging and wiring
//!
//! # Example
//!
//! ```no_run
//! use dualstore::application::WriteContext;
//! use dualstore::domain::Record;
//! use dualstore::infrastructure::{bootstrap, config::settings::Config};
//!
//! # async fn run(profile: dualstore::domain::UserProfile) -> dualstore::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let services = bootstrap::build(&config)?;
//! let result = services
//!     .coordinator
//!     .write(&WriteContext::default(), &Record::User(profile))
//!     .await;
//! println!("{:?}", result.consistency);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
