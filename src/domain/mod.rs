//! Storage-agnostic domain types. No I/O.

pub mod breaker;
pub mod envelope;
pub mod error;
pub mod id;
pub mod identity;
pub mod record;
pub mod storage;

pub use breaker::{BreakerSnapshot, CircuitState};
pub use envelope::{ResponseEnvelope, ENVELOPE_VERSION};
pub use error::ContractError;
pub use id::UserId;
pub use identity::{AuthIdentity, Metadata, Role, UserProfile};
pub use record::{Document, Record, RecordKey};
pub use storage::{
    Backend, BackendOutcome, Consistency, DegradationMode, DualStorageResult, SkipReason,
    StorageDetails, StorageStatus, StoreStatus,
};
