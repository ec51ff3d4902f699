//! ATX LED Sensor
//!
//! Reads power LED status from GPIO to determine if the target system is powered on.

use tracing::trace;

use super::executor::read_line;
use super::types::{GpioLine, PowerState};
use crate::error::Result;

/// LED sensor for reading power status
///
/// The state is read from the line on every call and never cached.
#[derive(Debug, Clone)]
pub struct LedSensor {
    line: GpioLine,
    inverted: bool,
}

impl LedSensor {
    /// Create a new LED sensor; `inverted` means logical 0 is On
    pub fn new(line: GpioLine, inverted: bool) -> Self {
        Self { line, inverted }
    }

    /// Read the current power state
    ///
    /// Line errors are returned unchanged.
    pub async fn read(&self) -> Result<PowerState> {
        let value = read_line(&self.line).await?;
        let state = PowerState::from_led_value(value, self.inverted);
        trace!("{} reads {} ({})", self.line.name(), value, state);
        Ok(state)
    }
}
