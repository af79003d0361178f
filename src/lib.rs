//! contact-courier library
//!
//! Finds a contact in a messaging app's on-screen widget tree and sends them a
//! message, driving the device through `adb`.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial library structure

// Engine
pub mod config;
pub mod courier;
pub mod delivery;
pub mod device;
pub mod error;
pub mod resolver;
pub mod scraper;
pub mod suggest;
pub mod timing;

// Front
pub mod commands;
pub mod output;
pub mod prompt;
