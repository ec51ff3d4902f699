//! Redfish service core
//!
//! Boot override state, reset action dispatch and the resource documents
//! rendered by the web layer.

pub mod actions;
pub mod boot;
pub mod resources;

pub use actions::{dispatch, DispatchOutcome, ResetType};
pub use boot::{BootOverride, BootStore, BootUpdate, ALLOWABLE_TARGETS};
