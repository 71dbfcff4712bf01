//! In-memory backend doubles with scripted behavior.
//!
//! - [`ScriptedBackend`] - stores records in a map; latency, failure and
//!   health can be changed while a test runs. Counts every call.
//! - [`StaticDirectory`] - fixed identity lookup for reconcile tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AuthIdentity, Backend, Record, RecordKey, UserId};
use crate::error::{Result, StorageError};
use crate::port::outbound::storage::{IdentityDirectory, StorageBackend, WriteAck};

/// A scripted storage backend.
pub struct ScriptedBackend {
    backend: Backend,
    latency: Mutex<Duration>,
    failure: Mutex<Option<String>>,
    healthy: AtomicBool,
    records: Mutex<HashMap<RecordKey, Record>>,
    write_count: AtomicU32,
    read_count: AtomicU32,
}

impl ScriptedBackend {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            latency: Mutex::new(Duration::ZERO),
            failure: Mutex::new(None),
            healthy: AtomicBool::new(true),
            records: Mutex::new(HashMap::new()),
            write_count: AtomicU32::new(0),
            read_count: AtomicU32::new(0),
        }
    }

    pub fn relational() -> Self {
        Self::new(Backend::Relational)
    }

    pub fn platform() -> Self {
        Self::new(Backend::Platform)
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    pub fn failing(self, reason: &str) -> Self {
        self.fail_with(reason);
        self
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Make every following call fail with `reason`.
    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock() = Some(reason.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Record currently stored under `key`.
    pub fn stored(&self, key: &RecordKey) -> Option<Record> {
        self.records.lock().get(key).cloned()
    }

    /// Seed a record without counting a write.
    pub fn insert(&self, record: Record) {
        self.records.lock().insert(record.key(), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    async fn pause(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn scripted_failure(&self) -> Result<()> {
        match self.failure.lock().clone() {
            Some(reason) => Err(StorageError::Write {
                backend: self.backend,
                reason,
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageBackend for ScriptedBackend {
    fn backend(&self) -> Backend {
        self.backend
    }

    async fn write(&self, record: &Record) -> Result<WriteAck> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.scripted_failure()?;
        self.records.lock().insert(record.key(), record.clone());
        Ok(WriteAck::new(1))
    }

    async fn read(&self, key: &RecordKey) -> Result<Option<Record>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.scripted_failure()?;
        Ok(self.stored(key))
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Identity directory backed by a fixed map.
#[derive(Default)]
pub struct StaticDirectory {
    identities: Mutex<HashMap<UserId, AuthIdentity>>,
    latency: Mutex<Duration>,
    failure: Mutex<Option<String>>,
    call_count: AtomicU32,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `identity`. Identities with a malformed id are ignored.
    pub fn with_identity(self, identity: AuthIdentity) -> Self {
        if let Ok(id) = UserId::parse(&identity.id) {
            self.identities.lock().insert(id, identity);
        }
        self
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock() = Some(reason.to_string());
    }

    /// Delay every lookup by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityDirectory for StaticDirectory {
    async fn fetch_identity(&self, id: &UserId) -> Result<Option<AuthIdentity>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if let Some(reason) = self.failure.lock().clone() {
            return Err(StorageError::Write {
                backend: Backend::Platform,
                reason,
            }
            .into());
        }
        Ok(self.identities.lock().get(id).cloned())
    }
}
