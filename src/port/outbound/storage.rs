//! Storage backend ports.

use async_trait::async_trait;

use crate::domain::{AuthIdentity, Backend, Record, RecordKey, UserId};
use crate::error::Result;

/// Acknowledgement returned by a backend that accepted a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteAck {
    /// Rows or documents the backend reports as affected.
    pub affected: usize,
}

impl WriteAck {
    #[must_use]
    pub const fn new(affected: usize) -> Self {
        Self { affected }
    }
}

/// One storage backend as seen by the coordinator.
///
/// Implementations own their transport and error taxonomy; the coordinator
/// only distinguishes `Ok` from `Err`. Implementations must not retry
/// internally on behalf of the coordinator: one call is one attempt.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> Backend;

    /// Persist a record, replacing any existing version.
    async fn write(&self, record: &Record) -> Result<WriteAck>;

    /// Read a record by key.
    async fn read(&self, key: &RecordKey) -> Result<Option<Record>>;

    /// Cheap liveness probe. Never errors; unreachable means `false`.
    async fn health_check(&self) -> bool;
}

/// Lookup of the authoritative identity for a user.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn fetch_identity(&self, id: &UserId) -> Result<Option<AuthIdentity>>;
}
