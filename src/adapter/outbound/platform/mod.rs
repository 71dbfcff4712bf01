//! Backend-as-a-service platform integration (Store B).

pub mod client;
pub mod dto;
pub mod settings;

pub use client::PlatformStore;
pub use settings::{PlatformConfig, SERVICE_KEY_ENV};
