//! Boot source override store
//!
//! In-memory only: every restart begins from the default override.

use arc_swap::ArcSwap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};

/// Boot targets a client may select, in advertised order
pub const ALLOWABLE_TARGETS: &[&str] = &[
    "None",
    "Pxe",
    "Cd",
    "Usb",
    "Hdd",
    "BiosSetup",
    "Utilities",
    "Diags",
    "UefiShell",
    "UefiTarget",
    "SDCard",
    "UefiHttp",
    "RemoteDrive",
    "UefiBootNext",
];

/// Current boot source override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOverride {
    /// Disabled, Once or Continuous (written through unvalidated)
    pub enabled: String,
    /// Boot mode tag, e.g. UEFI or Legacy
    pub mode: String,
    /// Always one of `allowable_targets`
    pub target: String,
    pub allowable_targets: &'static [&'static str],
}

impl Default for BootOverride {
    fn default() -> Self {
        Self {
            enabled: "Disabled".to_string(),
            mode: "UEFI".to_string(),
            target: "None".to_string(),
            allowable_targets: ALLOWABLE_TARGETS,
        }
    }
}

/// Partial boot override update, as sent in a system PATCH
///
/// Absent and empty fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BootUpdate {
    #[serde(rename = "BootSourceOverrideEnabled")]
    pub enabled: Option<String>,
    #[serde(rename = "BootSourceOverrideMode")]
    pub mode: Option<String>,
    #[serde(rename = "BootSourceOverrideTarget")]
    pub target: Option<String>,
}

fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl BootUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(target) = provided(&self.target) {
            if !ALLOWABLE_TARGETS.contains(&target) {
                return Err(AppError::InvalidBootTarget(target.to_string()));
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, config: &mut BootOverride) {
        if let Some(enabled) = provided(&self.enabled) {
            config.enabled = enabled.to_string();
        }
        if let Some(target) = provided(&self.target) {
            config.target = target.to_string();
        }
        if let Some(mode) = provided(&self.mode) {
            config.mode = mode.to_string();
        }
    }

    pub fn is_empty(&self) -> bool {
        provided(&self.enabled).is_none()
            && provided(&self.mode).is_none()
            && provided(&self.target).is_none()
    }
}

/// Boot override store
///
/// Uses `ArcSwap` for lock-free reads; each update swaps in a whole new
/// value, so readers never observe a half-applied patch.
#[derive(Debug)]
pub struct BootStore {
    cache: ArcSwap<BootOverride>,
}

impl Default for BootStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BootStore {
    pub fn new() -> Self {
        Self {
            cache: ArcSwap::from_pointee(BootOverride::default()),
        }
    }

    /// Snapshot of the current override (lock-free)
    pub fn get(&self) -> Arc<BootOverride> {
        self.cache.load_full()
    }

    /// Validate and apply a partial update
    ///
    /// On error the stored override is left untouched.
    pub fn apply(&self, update: &BootUpdate) -> Result<()> {
        update.validate()?;

        if update.is_empty() {
            return Ok(());
        }

        // rcu retries against the latest value, so concurrent patches never
        // interleave field by field
        self.cache.rcu(|current| {
            let mut next = BootOverride::clone(current);
            update.apply_to(&mut next);
            next
        });

        let current = self.cache.load();
        info!(
            "Boot override updated: enabled={}, mode={}, target={}",
            current.enabled, current.mode, current.target
        );
        Ok(())
    }
}
