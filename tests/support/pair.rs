//! A coordinator wired to two scripted backends.

use std::sync::Arc;

use dualstore::application::{
    BreakerPolicy, BreakerRegistry, CoordinatorOptions, DualWriteCoordinator, IdentitySync,
};
use dualstore::testkit::backend::{ScriptedBackend, StaticDirectory};
use dualstore::testkit::config;

pub struct Pair {
    pub relational: Arc<ScriptedBackend>,
    pub platform: Arc<ScriptedBackend>,
    pub directory: Arc<StaticDirectory>,
    pub breakers: Arc<BreakerRegistry>,
    pub coordinator: Arc<DualWriteCoordinator>,
}

impl Pair {
    pub fn new(policy: BreakerPolicy, options: CoordinatorOptions) -> Self {
        Self::with_directory(policy, options, StaticDirectory::new())
    }

    pub fn with_directory(
        policy: BreakerPolicy,
        options: CoordinatorOptions,
        directory: StaticDirectory,
    ) -> Self {
        let relational = Arc::new(ScriptedBackend::relational());
        let platform = Arc::new(ScriptedBackend::platform());
        let breakers = Arc::new(BreakerRegistry::new(policy));
        let coordinator = Arc::new(DualWriteCoordinator::new(
            relational.clone(),
            platform.clone(),
            breakers.clone(),
            options,
        ));
        Self {
            relational,
            platform,
            directory: Arc::new(directory),
            breakers,
            coordinator,
        }
    }

    /// Default thresholds with a short write timeout.
    pub fn standard() -> Self {
        Self::new(config::breaker(5, 60_000), config::coordinator(500))
    }

    pub fn identity_sync(&self) -> IdentitySync {
        IdentitySync::new(self.coordinator.clone(), self.directory.clone())
    }
}
