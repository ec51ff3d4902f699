//! ATX Power Control Module
//!
//! Drives the momentary power and reset buttons of the managed machine through
//! the board's GPIO lines, and senses its power LED.
//!
//! # Features
//!
//! - Board detection from the hardware version file (alpha, beta, pcie)
//! - Power button control (short press for on/graceful shutdown, long press for force off)
//! - Reset button control
//! - Power status from the power LED (active low on the reference boards)
//! - Disk activity LED where the board wires one
//!
//! # Example
//!
//! ```ignore
//! use nanokvm_redfish::atx::{detect, AtxController, AtxControllerConfig};
//!
//! let profile = detect(Path::new("/etc/kvm/hw")).await?;
//! let controller = AtxController::new(AtxControllerConfig::new(profile));
//! if controller.power_state().await? == PowerState::Off {
//!     controller.power_short().await?;
//! }
//! ```

mod controller;
mod executor;
mod hardware;
mod led;
mod types;

pub use controller::{AtxController, AtxControllerConfig};
pub use executor::{pulse_line, read_line, timing};
pub use hardware::{detect, HardwareProfile, DEFAULT_VERSION_FILE};
pub use led::LedSensor;
pub use types::{AtxAction, GpioLine, HardwareVariant, PowerState, PressTimings};

#[cfg(test)]
pub(crate) use controller::tests::{fixture_controller, fixture_profile, test_timings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        // Verify all public exports are accessible
        let _: HardwareVariant = HardwareVariant::Alpha;
        let _: PowerState = PowerState::On;
        let _: PressTimings = PressTimings::default();
        let _: HardwareProfile = HardwareProfile::for_variant(HardwareVariant::Pcie);
        let _: GpioLine = GpioLine::absent("Disk LED");
    }
}
