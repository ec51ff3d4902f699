//! ComputerSystem handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::redfish::resources::{Collection, ComputerSystem};
use crate::redfish::{dispatch, BootUpdate, DispatchOutcome, ResetType};
use crate::state::AppState;

/// Map a body decode failure to a 400
fn decode<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Get the system collection
pub async fn list_systems() -> Json<Collection> {
    Json(Collection::systems())
}

/// Get the managed system, reading power state from the LED
pub async fn get_system(State(state): State<Arc<AppState>>) -> Result<Json<ComputerSystem>> {
    let power_state = state.atx.power_state().await?;
    let boot = state.boot.get();
    Ok(Json(ComputerSystem::new(power_state, &boot)))
}

/// System PATCH body
#[derive(Debug, Deserialize)]
pub struct SystemPatchRequest {
    #[serde(rename = "Boot")]
    pub boot: Option<BootUpdate>,
}

/// Update the boot source override
pub async fn patch_system(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SystemPatchRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let req = decode(payload)?;

    if let Some(boot) = req.boot {
        state.boot.apply(&boot)?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// ComputerSystem.Reset body
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(rename = "ResetType", default)]
    pub reset_type: ResetType,
}

/// Perform a ComputerSystem.Reset action
pub async fn reset_system(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ResetRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let req = decode(payload)?;

    match dispatch(&state.atx, &req.reset_type).await? {
        DispatchOutcome::Pressed(action) => {
            info!("ResetType {} executed ({:?} press)", req.reset_type.as_str(), action);
        }
        DispatchOutcome::AlreadyInState(power_state) => {
            info!(
                "ResetType {} skipped, system already {}",
                req.reset_type.as_str(),
                power_state
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
