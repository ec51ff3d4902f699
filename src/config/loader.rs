//! Configuration file loading
//!
//! Settings come from an optional TOML file; nothing is written back.

use std::path::Path;
use tracing::{debug, info};

use super::AppConfig;
use crate::error::{AppError, Result};

/// Load configuration from `path`, or defaults when no file is given
///
/// A missing file falls back to defaults; a file that exists but does not
/// parse is an error.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        debug!("No configuration file given, using defaults");
        return Ok(AppConfig::default());
    };

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            return Ok(AppConfig::default());
        }
        Err(e) => {
            return Err(AppError::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
