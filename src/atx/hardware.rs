//! Hardware profiles and board detection
//!
//! Each board revision wires the power/reset buttons and LEDs to different
//! GPIO lines. The revision is read once at startup from a version file.

use std::path::Path;
use tracing::{debug, info};

use super::types::{GpioLine, HardwareVariant};
use crate::error::{AppError, Result};

/// Default location of the hardware version file
pub const DEFAULT_VERSION_FILE: &str = "/etc/kvm/hw";

/// Compiled-in GPIO assignment for one board revision
struct LineMap {
    reset: &'static str,
    power: &'static str,
    power_led: &'static str,
    disk_led: Option<&'static str>,
}

const ALPHA_LINES: LineMap = LineMap {
    reset: "/sys/class/gpio/gpio507/value",
    power: "/sys/class/gpio/gpio503/value",
    power_led: "/sys/class/gpio/gpio504/value",
    disk_led: Some("/sys/class/gpio/gpio505/value"),
};

const BETA_LINES: LineMap = LineMap {
    reset: "/sys/class/gpio/gpio505/value",
    power: "/sys/class/gpio/gpio503/value",
    power_led: "/sys/class/gpio/gpio504/value",
    disk_led: None,
};

const PCIE_LINES: LineMap = LineMap {
    reset: "/sys/class/gpio/gpio505/value",
    power: "/sys/class/gpio/gpio503/value",
    power_led: "/sys/class/gpio/gpio504/value",
    disk_led: None,
};

/// Resolved GPIO lines of the active board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareProfile {
    pub variant: HardwareVariant,
    pub reset: GpioLine,
    pub power: GpioLine,
    pub power_led: GpioLine,
    pub disk_led: GpioLine,
}

impl HardwareProfile {
    /// Look up the compiled-in profile for a variant
    pub fn for_variant(variant: HardwareVariant) -> Self {
        let lines = match variant {
            HardwareVariant::Alpha => &ALPHA_LINES,
            HardwareVariant::Beta => &BETA_LINES,
            HardwareVariant::Pcie => &PCIE_LINES,
        };

        Self {
            variant,
            reset: GpioLine::new("Reset button", lines.reset),
            power: GpioLine::new("Power button", lines.power),
            power_led: GpioLine::new("Power LED", lines.power_led),
            disk_led: match lines.disk_led {
                Some(path) => GpioLine::new("Disk LED", path),
                None => GpioLine::absent("Disk LED"),
            },
        }
    }

    /// Re-base every line path under `root`
    pub fn with_root(&self, root: &Path) -> Self {
        Self {
            variant: self.variant,
            reset: self.reset.rebased(root),
            power: self.power.rebased(root),
            power_led: self.power_led.rebased(root),
            disk_led: self.disk_led.rebased(root),
        }
    }
}

/// Detect the board revision from the version file
///
/// The file content is trimmed and matched case-sensitively against the
/// known tags.
pub async fn detect(version_file: &Path) -> Result<HardwareProfile> {
    debug!("Reading hardware version from {}", version_file.display());

    let content = tokio::fs::read_to_string(version_file)
        .await
        .map_err(|source| AppError::ConfigUnreadable {
            path: version_file.to_path_buf(),
            source,
        })?;

    let variant: HardwareVariant = content.trim().parse()?;
    info!("Detected hardware version: {}", variant);

    Ok(HardwareProfile::for_variant(variant))
}
