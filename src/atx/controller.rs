//! ATX Controller
//!
//! High-level controller for ATX power management on the detected board.
//! Button presses are reproduced purely by duration; the target machine's
//! firmware decides what a press means.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use super::executor::{read_line, AtxKeyExecutor};
use super::hardware::HardwareProfile;
use super::led::LedSensor;
use super::types::{AtxAction, PowerState, PressTimings};
use crate::error::Result;

/// ATX power control configuration
#[derive(Debug, Clone)]
pub struct AtxControllerConfig {
    /// Active board profile
    pub profile: HardwareProfile,
    /// Hold duration of each press
    pub timings: PressTimings,
    /// Power LED is active low (logical 0 = On)
    pub led_inverted: bool,
}

impl AtxControllerConfig {
    pub fn new(profile: HardwareProfile) -> Self {
        Self {
            profile,
            timings: PressTimings::default(),
            led_inverted: true,
        }
    }
}

/// ATX Controller
///
/// Built once from the detected profile and shared by every request.
#[derive(Debug)]
pub struct AtxController {
    profile: HardwareProfile,
    timings: PressTimings,
    power_executor: Arc<AtxKeyExecutor>,
    reset_executor: Arc<AtxKeyExecutor>,
    led_sensor: LedSensor,
    transition_lock: Mutex<()>,
}

impl AtxController {
    /// Create a new ATX controller with the specified configuration
    pub fn new(config: AtxControllerConfig) -> Self {
        let AtxControllerConfig {
            profile,
            timings,
            led_inverted,
        } = config;

        info!(
            "ATX controller on {} hardware (short {}ms, long {}ms, reset {}ms)",
            profile.variant,
            timings.short_press.as_millis(),
            timings.long_press.as_millis(),
            timings.reset_press.as_millis()
        );

        Self {
            power_executor: Arc::new(AtxKeyExecutor::new(profile.power.clone())),
            reset_executor: Arc::new(AtxKeyExecutor::new(profile.reset.clone())),
            led_sensor: LedSensor::new(profile.power_led.clone(), led_inverted),
            transition_lock: Mutex::new(()),
            profile,
            timings,
        }
    }

    pub fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    /// Serialize a read-then-press sequence against other callers
    ///
    /// Hold the guard across the power state read and the press it decides,
    /// so two requests cannot both act on the same reading.
    pub async fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.transition_lock.lock().await
    }

    /// Trigger a power action (short/long/reset)
    pub async fn trigger_power_action(&self, action: AtxAction) -> Result<()> {
        let executor = match action {
            AtxAction::Short | AtxAction::Long => &self.power_executor,
            AtxAction::Reset => &self.reset_executor,
        };
        executor.pulse(self.timings.duration(action)).await
    }

    /// Trigger a short power button press
    pub async fn power_short(&self) -> Result<()> {
        self.trigger_power_action(AtxAction::Short).await
    }

    /// Trigger a long power button press
    pub async fn power_long(&self) -> Result<()> {
        self.trigger_power_action(AtxAction::Long).await
    }

    /// Trigger a reset button press, regardless of power state
    pub async fn reset(&self) -> Result<()> {
        self.trigger_power_action(AtxAction::Reset).await
    }

    /// Read the current power state from the power LED
    pub async fn power_state(&self) -> Result<PowerState> {
        self.led_sensor.read().await
    }

    /// Whether the board wires a disk activity LED
    pub fn disk_led_supported(&self) -> bool {
        self.profile.disk_led.is_present()
    }

    /// Read the disk activity LED (non-zero = active)
    pub async fn disk_activity(&self) -> Result<bool> {
        Ok(read_line(&self.profile.disk_led).await? != 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::atx::HardwareVariant;
    use crate::error::AppError;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// Short timings so pulse tests stay fast
    pub(crate) fn test_timings() -> PressTimings {
        PressTimings {
            short_press: Duration::from_millis(20),
            long_press: Duration::from_millis(40),
            reset_press: Duration::from_millis(20),
        }
    }

    /// Create a fake sysfs tree for `variant` under `dir`, every line at "0"
    pub(crate) fn fixture_profile(dir: &Path, variant: HardwareVariant) -> HardwareProfile {
        let profile = HardwareProfile::for_variant(variant).with_root(dir);
        for line in [
            &profile.reset,
            &profile.power,
            &profile.power_led,
            &profile.disk_led,
        ] {
            if let Some(path) = line.path() {
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, "0").unwrap();
            }
        }
        profile
    }

    pub(crate) fn fixture_controller(dir: &Path, variant: HardwareVariant) -> AtxController {
        AtxController::new(AtxControllerConfig {
            profile: fixture_profile(dir, variant),
            timings: test_timings(),
            led_inverted: true,
        })
    }

    fn path_of(line: &crate::atx::GpioLine) -> PathBuf {
        line.path().unwrap().to_path_buf()
    }

    #[tokio::test]
    async fn test_power_state_follows_led() {
        let dir = TempDir::new().unwrap();
        let atx = fixture_controller(dir.path(), HardwareVariant::Alpha);
        let led = path_of(&atx.profile().power_led);

        std::fs::write(&led, "0").unwrap();
        assert_eq!(atx.power_state().await.unwrap(), PowerState::On);

        std::fs::write(&led, "1\n").unwrap();
        assert_eq!(atx.power_state().await.unwrap(), PowerState::Off);
    }

    #[tokio::test]
    async fn test_power_state_propagates_malformed() {
        let dir = TempDir::new().unwrap();
        let atx = fixture_controller(dir.path(), HardwareVariant::Beta);
        std::fs::write(path_of(&atx.profile().power_led), "xyz").unwrap();

        let err = atx.power_state().await.unwrap_err();
        assert!(matches!(err, AppError::MalformedValue { .. }));
    }

    #[tokio::test]
    async fn test_press_durations() {
        let dir = TempDir::new().unwrap();
        let atx = fixture_controller(dir.path(), HardwareVariant::Alpha);

        let start = Instant::now();
        atx.power_long().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));

        let start = Instant::now();
        atx.power_short().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));

        assert_eq!(std::fs::read_to_string(path_of(&atx.profile().power)).unwrap(), "0");
    }

    #[tokio::test]
    async fn test_reset_touches_only_reset_line() {
        let dir = TempDir::new().unwrap();
        let atx = fixture_controller(dir.path(), HardwareVariant::Pcie);
        let power = path_of(&atx.profile().power);
        let reset = path_of(&atx.profile().reset);
        std::fs::write(&power, "untouched").unwrap();
        std::fs::write(&reset, "1").unwrap();

        atx.reset().await.unwrap();

        assert_eq!(std::fs::read_to_string(&reset).unwrap(), "0");
        assert_eq!(std::fs::read_to_string(&power).unwrap(), "untouched");
    }

    #[tokio::test]
    async fn test_disk_activity() {
        let dir = TempDir::new().unwrap();
        let atx = fixture_controller(dir.path(), HardwareVariant::Alpha);
        assert!(atx.disk_led_supported());
        assert!(!atx.disk_activity().await.unwrap());

        std::fs::write(path_of(&atx.profile().disk_led), "1").unwrap();
        assert!(atx.disk_activity().await.unwrap());
    }

    #[tokio::test]
    async fn test_disk_activity_absent_on_beta() {
        let dir = TempDir::new().unwrap();
        let atx = fixture_controller(dir.path(), HardwareVariant::Beta);
        assert!(!atx.disk_led_supported());

        let err = atx.disk_activity().await.unwrap_err();
        assert!(matches!(err, AppError::CapabilityAbsent("Disk LED")));
    }
}
