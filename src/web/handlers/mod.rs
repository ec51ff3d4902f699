pub mod systems;

use axum::{extract::State, http::Uri, Json};
use std::sync::Arc;
use tracing::warn;

use crate::error::AppError;
use crate::redfish::resources::{Chassis, Collection, Manager, ServiceRoot};
use crate::state::AppState;

pub use systems::{get_system, list_systems, patch_system, reset_system};

// ============================================================================
// Service Root
// ============================================================================

pub async fn service_root() -> Json<ServiceRoot> {
    Json(ServiceRoot::new())
}

/// Redfish error for paths outside the resource tree
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

// ============================================================================
// Managers
// ============================================================================

pub async fn list_managers() -> Json<Collection> {
    Json(Collection::managers())
}

pub async fn get_manager() -> Json<Manager> {
    Json(Manager::bmc())
}

// ============================================================================
// Chassis
// ============================================================================

pub async fn list_chassis() -> Json<Collection> {
    Json(Collection::chassis())
}

/// Get the chassis, with disk activity where the board wires the LED
pub async fn get_chassis(State(state): State<Arc<AppState>>) -> Json<Chassis> {
    let disk_activity = if state.atx.disk_led_supported() {
        match state.atx.disk_activity().await {
            Ok(active) => Some(active),
            Err(e) => {
                warn!("Failed to read disk activity LED: {}", e);
                None
            }
        }
    } else {
        None
    };

    Json(Chassis::new(
        state.atx.profile().variant.as_str(),
        disk_activity,
    ))
}
