//! ComputerSystem.Reset action dispatch
//!
//! Every dispatch re-reads the power LED before acting, so repeated or
//! concurrent requests converge on the machine's real state.

use serde::Deserialize;
use tracing::{debug, info};

use crate::atx::{AtxAction, AtxController, PowerState};
use crate::error::{AppError, Result};

/// Requested reset type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ResetType {
    /// Redfish `On`
    PowerOn,
    ForceOff,
    GracefulShutdown,
    ForceRestart,
    Unrecognized(String),
}

impl ResetType {
    /// Reset types advertised in `ResetType@Redfish.AllowableValues`
    pub const ALLOWABLE_VALUES: [&'static str; 4] =
        ["On", "ForceOff", "GracefulShutdown", "ForceRestart"];

    pub fn parse(name: &str) -> Self {
        match name {
            "On" => Self::PowerOn,
            "ForceOff" => Self::ForceOff,
            "GracefulShutdown" => Self::GracefulShutdown,
            "ForceRestart" => Self::ForceRestart,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PowerOn => "On",
            Self::ForceOff => "ForceOff",
            Self::GracefulShutdown => "GracefulShutdown",
            Self::ForceRestart => "ForceRestart",
            Self::Unrecognized(name) => name,
        }
    }

    /// Button press for this action, and the power state it requires
    ///
    /// `None` as the required state means the press is unconditional.
    fn plan(&self) -> Result<(Option<PowerState>, AtxAction)> {
        match self {
            Self::PowerOn => Ok((Some(PowerState::Off), AtxAction::Short)),
            Self::ForceOff => Ok((Some(PowerState::On), AtxAction::Long)),
            Self::GracefulShutdown => Ok((Some(PowerState::On), AtxAction::Short)),
            Self::ForceRestart => Ok((None, AtxAction::Reset)),
            Self::Unrecognized(name) => Err(AppError::InvalidActionName(name.clone())),
        }
    }
}

impl From<String> for ResetType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl Default for ResetType {
    fn default() -> Self {
        Self::Unrecognized(String::new())
    }
}

/// What a dispatch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A button was pressed
    Pressed(AtxAction),
    /// The machine was already in the requested state
    AlreadyInState(PowerState),
}

/// Carry out a reset action against the controller
pub async fn dispatch(atx: &AtxController, reset_type: &ResetType) -> Result<DispatchOutcome> {
    let (required, action) = reset_type.plan()?;

    // Held until the press completes; a queued request then sees the new state
    let _transition = atx.lock_transition().await;

    if let Some(required) = required {
        let state = atx.power_state().await?;
        if state != required {
            debug!(
                "{} ignored: power is already {}",
                reset_type.as_str(),
                state
            );
            return Ok(DispatchOutcome::AlreadyInState(state));
        }
    }

    info!("{} requested, pressing {:?}", reset_type.as_str(), action);
    atx.trigger_power_action(action).await?;
    Ok(DispatchOutcome::Pressed(action))
}
