//! Command implementations.
//!
//! CHANGELOG:
//! - 10/18/2026 - send, interactive, screen, doctor, config

pub mod config;
pub mod doctor;
pub mod interactive;
pub mod screen;
pub mod send;

use crate::config::Config;
use crate::device::adb::AdbDevice;
use crate::error::Result;

/// Exit status when a run finished without sending.
pub const EXIT_NOT_SENT: u8 = 2;

/// Connect to the configured device.
pub fn connect(config: &Config) -> Result<AdbDevice> {
    AdbDevice::connect(
        config.adb_path(),
        config.device.serial.clone(),
        config.device.text_entry,
    )
}
