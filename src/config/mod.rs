//! Service configuration

mod loader;
mod schema;

pub use loader::load_config;
pub use schema::{AppConfig, AtxConfig, HardwareConfig, WebConfig};
