use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::atx::{timing, AtxControllerConfig, HardwareProfile, PressTimings, DEFAULT_VERSION_FILE};
use crate::error::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Web server settings
    pub web: WebConfig,
    /// Hardware detection settings
    pub hardware: HardwareConfig,
    /// ATX power control settings
    pub atx: AtxConfig,
}

impl AppConfig {
    /// Check settings that would make the service misbehave at runtime
    pub fn validate(&self) -> Result<()> {
        self.web.bind_ips()?;
        self.atx.validate()
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    /// HTTP port
    pub http_port: u16,
    /// HTTPS port
    pub https_port: u16,
    /// Bind address
    pub bind_address: String,
    /// Bind addresses (preferred over `bind_address` when non-empty)
    pub bind_addresses: Vec<String>,
    /// Enable HTTPS
    pub https_enabled: bool,
    /// Custom SSL certificate path
    pub ssl_cert_path: Option<String>,
    /// Custom SSL key path
    pub ssl_key_path: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            https_port: 8443,
            bind_address: "0.0.0.0".to_string(),
            bind_addresses: Vec::new(),
            https_enabled: false,
            ssl_cert_path: None,
            ssl_key_path: None,
        }
    }
}

impl WebConfig {
    /// Resolve bind IPs, preferring `bind_addresses` when set
    pub fn bind_ips(&self) -> Result<Vec<IpAddr>> {
        let raw_addrs = if !self.bind_addresses.is_empty() {
            self.bind_addresses.as_slice()
        } else {
            std::slice::from_ref(&self.bind_address)
        };

        let mut addrs: Vec<IpAddr> = Vec::new();
        for addr in raw_addrs {
            let ip: IpAddr = addr
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid bind address: {}", addr)))?;
            if !addrs.contains(&ip) {
                addrs.push(ip);
            }
        }

        Ok(addrs)
    }

    /// Port the server listens on
    pub fn port(&self) -> u16 {
        if self.https_enabled {
            self.https_port
        } else {
            self.http_port
        }
    }
}

/// Hardware detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HardwareConfig {
    /// File holding the board revision tag
    pub version_file: PathBuf,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            version_file: PathBuf::from(DEFAULT_VERSION_FILE),
        }
    }
}

/// ATX power control configuration
///
/// Defaults match the reference boards; other hardware may need different
/// press durations or LED polarity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtxConfig {
    /// Short press (power on / graceful shutdown) in milliseconds
    pub short_press_ms: u64,
    /// Long press (force off) in milliseconds
    pub long_press_ms: u64,
    /// Reset press in milliseconds
    pub reset_press_ms: u64,
    /// Whether the power LED is active low (0 = On)
    pub led_inverted: bool,
}

impl Default for AtxConfig {
    fn default() -> Self {
        Self {
            short_press_ms: timing::SHORT_PRESS.as_millis() as u64,
            long_press_ms: timing::LONG_PRESS.as_millis() as u64,
            reset_press_ms: timing::RESET_PRESS.as_millis() as u64,
            led_inverted: true,
        }
    }
}

impl AtxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.short_press_ms == 0 || self.long_press_ms == 0 || self.reset_press_ms == 0 {
            return Err(AppError::Config(
                "ATX press durations must be greater than 0".to_string(),
            ));
        }
        if self.long_press_ms <= self.short_press_ms {
            return Err(AppError::Config(format!(
                "long_press_ms ({}) must exceed short_press_ms ({})",
                self.long_press_ms, self.short_press_ms
            )));
        }
        Ok(())
    }

    pub fn timings(&self) -> PressTimings {
        PressTimings {
            short_press: Duration::from_millis(self.short_press_ms),
            long_press: Duration::from_millis(self.long_press_ms),
            reset_press: Duration::from_millis(self.reset_press_ms),
        }
    }

    /// Convert to AtxControllerConfig for the controller
    pub fn to_controller_config(&self, profile: HardwareProfile) -> AtxControllerConfig {
        AtxControllerConfig {
            profile,
            timings: self.timings(),
            led_inverted: self.led_inverted,
        }
    }
}
