//! ATX data types and structures
//!
//! Defines the hardware variants, line references and power state used by the
//! power control service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::executor::timing;
use crate::error::AppError;

/// Board revision, selected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareVariant {
    Alpha,
    Beta,
    Pcie,
}

impl HardwareVariant {
    /// All known variants, in registry order
    pub const ALL: [HardwareVariant; 3] = [Self::Alpha, Self::Beta, Self::Pcie];

    /// Tag as written in the hardware version file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Pcie => "pcie",
        }
    }
}

impl fmt::Display for HardwareVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HardwareVariant {
    type Err = AppError;

    /// Case-sensitive match against the known tags
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| AppError::UnknownHardware(s.to_string()))
    }
}

/// Reference to a single digital line (a sysfs `value` file)
///
/// An absent line means the capability is not wired on this board. It is
/// never read as value 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioLine {
    name: &'static str,
    path: Option<PathBuf>,
}

impl GpioLine {
    /// Create a line reference; an empty path yields an absent line
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name,
            path: (!path.as_os_str().is_empty()).then_some(path),
        }
    }

    /// Create a reference to a line that is not wired
    pub fn absent(name: &'static str) -> Self {
        Self { name, path: None }
    }

    /// Human readable capability name (e.g. "Power LED")
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.path.is_some()
    }

    /// Re-base the line path under `root`, keeping absent lines absent
    pub fn rebased(&self, root: &Path) -> Self {
        Self {
            name: self.name,
            path: self
                .path
                .as_ref()
                .map(|p| root.join(p.strip_prefix("/").unwrap_or(p))),
        }
    }
}

/// Logical power state inferred from the power LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Map a raw LED line value to a power state
    ///
    /// With `inverted` (the reference wiring) logical 0 means On; otherwise
    /// logical 1 means On. Any other value counts as "not the On level".
    pub fn from_led_value(value: i64, inverted: bool) -> Self {
        let on_level = if inverted { 0 } else { 1 };
        if value == on_level {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("On"),
            Self::Off => f.write_str("Off"),
        }
    }
}

/// Physical button press performed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AtxAction {
    /// Short press power button (power on or graceful shutdown)
    Short,
    /// Long press power button (force power off)
    Long,
    /// Press reset button
    Reset,
}

/// Hold durations for each press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTimings {
    pub short_press: Duration,
    pub long_press: Duration,
    pub reset_press: Duration,
}

impl Default for PressTimings {
    fn default() -> Self {
        Self {
            short_press: timing::SHORT_PRESS,
            long_press: timing::LONG_PRESS,
            reset_press: timing::RESET_PRESS,
        }
    }
}

impl PressTimings {
    pub fn duration(&self, action: AtxAction) -> Duration {
        match action {
            AtxAction::Short => self.short_press,
            AtxAction::Long => self.long_press,
            AtxAction::Reset => self.reset_press,
        }
    }
}
