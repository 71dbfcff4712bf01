//! SQLite persistence adapter.
//!
//! The relational backend: user profiles and documents stored with Diesel.

pub mod database;
pub mod store;

pub use store::SqliteStore;
