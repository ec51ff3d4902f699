//! ATX Key Executor
//!
//! Line-level GPIO primitives and a lightweight executor for a single button.
//! Each executor handles one line (power or reset) and serializes the pulses
//! issued on it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::types::GpioLine;
use crate::error::{AppError, Result};

/// Timing constants for ATX operations
///
/// The long press must stay above the board firmware's long-press threshold,
/// so keep its margin over the short press when retuning.
pub mod timing {
    use std::time::Duration;

    /// Short press duration (power on/graceful shutdown)
    pub const SHORT_PRESS: Duration = Duration::from_millis(800);

    /// Long press duration (force power off)
    pub const LONG_PRESS: Duration = Duration::from_millis(1000);

    /// Reset press duration
    pub const RESET_PRESS: Duration = Duration::from_millis(800);
}

fn line_path(line: &GpioLine) -> Result<&Path> {
    line.path().ok_or(AppError::CapabilityAbsent(line.name()))
}

async fn write_value(path: &Path, value: &'static str) -> Result<()> {
    tokio::fs::write(path, value)
        .await
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Read the logical value of a line
///
/// Out-of-range values are returned as-is; interpreting them is up to the
/// caller.
pub async fn read_line(line: &GpioLine) -> Result<i64> {
    let path = line_path(line)?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let trimmed = content.trim();
    trimmed.parse::<i64>().map_err(|_| AppError::MalformedValue {
        path: path.to_path_buf(),
        value: trimmed.to_string(),
    })
}

/// Assert a line, hold it for `hold`, then release it
///
/// Stops at the first failed write without restoring the line.
pub async fn pulse_line(line: &GpioLine, hold: Duration) -> Result<()> {
    let path = line_path(line)?;

    write_value(path, "1").await?;

    if !hold.is_zero() {
        sleep(hold).await;
    }

    write_value(path, "0").await
}

/// Executor for a single ATX key operation
///
/// Pulses on the same executor never interleave.
#[derive(Debug)]
pub struct AtxKeyExecutor {
    line: GpioLine,
    pulse_lock: Mutex<()>,
}

impl AtxKeyExecutor {
    /// Create a new executor for the given line
    pub fn new(line: GpioLine) -> Self {
        Self {
            line,
            pulse_lock: Mutex::new(()),
        }
    }

    /// Check if the line is wired on this board
    pub fn is_configured(&self) -> bool {
        self.line.is_present()
    }

    /// Pulse the button for the specified duration
    ///
    /// The pulse runs in its own task: dropping the returned future does not
    /// cut the hold short or leave the line asserted.
    pub async fn pulse(self: &Arc<Self>, duration: Duration) -> Result<()> {
        if !self.is_configured() {
            return Err(AppError::CapabilityAbsent(self.line.name()));
        }

        let executor = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = executor.pulse_lock.lock().await;
            info!(
                "Pulsing {} for {}ms",
                executor.line.name(),
                duration.as_millis()
            );
            // The caller may be gone, so a failure must be logged here
            match pulse_line(&executor.line, duration).await {
                Ok(()) => {
                    debug!("{} released", executor.line.name());
                    Ok(())
                }
                Err(e) => {
                    error!("Pulse on {} failed: {}", executor.line.name(), e);
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("Pulse task failed: {}", e)))?
    }
}
