//! NanoKVM Redfish - power control for GPIO-wired IP-KVM boards
//!
//! Exposes the board's ATX power/reset buttons and power LED through a
//! small Redfish-style HTTP API.

pub mod atx;
pub mod config;
pub mod error;
pub mod redfish;
pub mod state;
pub mod utils;
pub mod web;

pub use error::{AppError, Result};
