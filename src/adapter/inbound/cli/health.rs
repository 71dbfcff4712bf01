//! Handler for the `health` command.

use serde_json::json;

use super::output;
use crate::application::DualWriteCoordinator;
use crate::domain::{Backend, StorageStatus, StoreStatus};
use crate::error::{Result, StorageError};

const NO_HEALTHY_BACKEND: &str = "no storage backend is healthy";

/// Probe both backends for `service` and print their status.
///
/// Fails only when neither backend is healthy.
pub async fn execute(coordinator: &DualWriteCoordinator, service: &str) -> Result<()> {
    let status = coordinator.health(service).await;
    let mode = coordinator.degradation_mode(service);
    let breakers: Vec<_> = coordinator
        .breakers()
        .snapshots()
        .into_iter()
        .filter(|snap| snap.service == service)
        .collect();

    if output::is_json() {
        output::json_output(&json!({
            "command": "health",
            "service": service,
            "storageStatus": status,
            "degradationMode": mode,
            "breakers": breakers,
        }))?;
    } else {
        output::section("Storage Health");
        output::field("Service", service);
        for backend in Backend::ALL {
            output::field(
                &format!("{} ({})", backend, backend.store_key()),
                output::store_status(status.get(backend)),
            );
        }
        output::section("Circuit Breakers");
        for snap in &breakers {
            output::field(
                snap.backend.as_str(),
                format!(
                    "{} ({}/{} failures)",
                    snap.state, snap.failure_count, snap.failure_threshold
                ),
            );
        }
    }

    let any_healthy = Backend::ALL
        .iter()
        .any(|b| status.get(*b) == StoreStatus::Healthy);
    if !any_healthy {
        return Err(StorageError::AllFailed(NO_HEALTHY_BACKEND.to_string()).into());
    }
    if status == StorageStatus::healthy() {
        output::success("All backends healthy");
    } else {
        output::warning("Running degraded");
    }
    Ok(())
}
