//! Infrastructure configuration modules.

pub mod logging;
pub mod resilience;
pub mod settings;
pub mod storage;
