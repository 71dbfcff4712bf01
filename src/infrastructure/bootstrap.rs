//! Composition root: builds adapters and services from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::platform::PlatformStore;
use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::store::SqliteStore;
use crate::application::{BreakerRegistry, DualWriteCoordinator, IdentitySync};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::storage::{IdentityDirectory, StorageBackend};

/// Everything a caller needs to serve dual-write requests.
pub struct Services {
    pub breakers: Arc<BreakerRegistry>,
    pub coordinator: Arc<DualWriteCoordinator>,
    pub identity: IdentitySync,
}

/// Wire the coordinator around explicit adapters.
#[must_use]
pub fn assemble(
    config: &Config,
    relational: Arc<dyn StorageBackend>,
    platform: Arc<dyn StorageBackend>,
    directory: Arc<dyn IdentityDirectory>,
) -> Services {
    let breakers = Arc::new(BreakerRegistry::new(config.breaker_policy()));
    let coordinator = Arc::new(DualWriteCoordinator::new(
        relational,
        platform,
        Arc::clone(&breakers),
        config.coordinator_options(),
    ));
    let identity = IdentitySync::new(Arc::clone(&coordinator), directory);
    Services {
        breakers,
        coordinator,
        identity,
    }
}

/// Open the SQLite store and the platform client described by `config`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated, or the
/// platform HTTP client cannot be built.
pub fn build(config: &Config) -> Result<Services> {
    let pool = open(&config.relational.database)?;
    let relational = Arc::new(SqliteStore::new(pool));
    let platform = Arc::new(PlatformStore::from_config(
        &config.platform,
        config.platform_service_key.clone(),
    )?);

    info!(
        database = %config.relational.database,
        platform_url = %platform.base_url(),
        platform_enabled = config.platform.enabled,
        service = %config.service_name,
        "Storage backends initialized"
    );

    Ok(assemble(config, relational, platform.clone(), platform))
}
