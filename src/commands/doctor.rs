//! Doctor command: check that everything a run needs is in place.
//!
//! Checks run in order and stop at the first one the rest depend on (no adb,
//! no device).
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;

use crate::config::{Config, ConfigSource};
use crate::device::adb::{AdbDevice, TextEntry, ADB_KEYBOARD_IME};
use crate::device::DeviceSurface;
use crate::output::OutputControls;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn ok(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Ok, detail: detail.into() }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Warn, detail: detail.into() }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, detail: detail.into() }
    }

    pub fn line(&self) -> String {
        let tag = match self.status {
            CheckStatus::Ok => "[ok]  ",
            CheckStatus::Warn => "[warn]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("{} {}: {}", tag, self.name, self.detail)
    }
}

pub fn run(config: &Config, source: &ConfigSource, output: &OutputControls) -> Result<ExitCode> {
    let checks = run_checks(config, source);
    let healthy = checks.iter().all(|c| c.status != CheckStatus::Fail);

    if output.json {
        output.print(&json!({
            "healthy": healthy,
            "checks": checks,
        }));
    } else {
        for check in &checks {
            println!("{}", check.line());
        }
        println!();
        println!("{}", if healthy { "Ready." } else { "Not ready." });
    }

    Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn run_checks(config: &Config, source: &ConfigSource) -> Vec<Check> {
    let mut checks = vec![config_check(source)];
    let adb_path = config.adb_path();
    let serial = config.device.serial.clone();

    let probe = AdbDevice::new(adb_path.clone(), serial.clone(), config.device.text_entry);
    match probe.version() {
        Ok(version) => checks.push(Check::ok("adb", version)),
        Err(e) => {
            checks.push(Check::fail("adb", format!("{} ({})", e, adb_path)));
            return checks;
        }
    }

    match probe.devices() {
        Ok(devices) => checks.push(devices_check(&devices, serial.as_deref())),
        Err(e) => checks.push(Check::fail("devices", e.to_string())),
    }

    let mut device = match AdbDevice::connect(adb_path, serial, config.device.text_entry) {
        Ok(device) => {
            checks.push(Check::ok("connection", "device is online"));
            device
        }
        Err(e) => {
            checks.push(Check::fail("connection", e.to_string()));
            return checks;
        }
    };

    checks.push(match device.model() {
        Ok(model) => Check::ok("model", model),
        Err(e) => Check::warn("model", e.to_string()),
    });

    checks.push(match device.window_size() {
        Ok((w, h)) => Check::ok("window size", format!("{}x{}", w, h)),
        Err(e) => Check::fail("window size", format!("{} (scroll-scan needs it)", e)),
    });

    let package = &config.app.package;
    checks.push(match device.package_installed(package) {
        Ok(true) => Check::ok("app", format!("{} installed", package)),
        Ok(false) => Check::fail("app", format!("{} is not installed", package)),
        Err(e) => Check::warn("app", e.to_string()),
    });

    checks.push(match device.input_methods() {
        Ok(imes) => text_entry_check(config.device.text_entry, &imes),
        Err(e) => Check::warn("text entry", e.to_string()),
    });

    checks
}

fn config_check(source: &ConfigSource) -> Check {
    let detail = match source {
        ConfigSource::Flag(path) => format!("{} (--config)", path.display()),
        ConfigSource::Env(path) => format!("{} (env)", path.display()),
        ConfigSource::UserDir(path) => path.display().to_string(),
        ConfigSource::Defaults => "built-in defaults".to_string(),
    };
    Check::ok("config", detail)
}

fn devices_check(devices: &[(String, String)], serial: Option<&str>) -> Check {
    let ready: Vec<&str> = devices
        .iter()
        .filter(|(_, state)| state == "device")
        .map(|(id, _)| id.as_str())
        .collect();

    match serial {
        Some(serial) if ready.contains(&serial) => Check::ok("devices", format!("{} ready", serial)),
        Some(serial) => Check::fail("devices", format!("{} is not attached or not authorized", serial)),
        None if ready.is_empty() => Check::fail("devices", "no device attached"),
        None if ready.len() > 1 => Check::warn(
            "devices",
            format!("{} devices attached, pass --serial to pick one", ready.len()),
        ),
        None => Check::ok("devices", format!("{} ready", ready[0])),
    }
}

fn text_entry_check(mode: TextEntry, imes: &[String]) -> Check {
    let has_keyboard = imes.iter().any(|ime| ime == ADB_KEYBOARD_IME);
    match (mode, has_keyboard) {
        (TextEntry::Input, _) => Check::ok("text entry", "input text (ASCII only)"),
        (_, true) => Check::ok("text entry", "ADB Keyboard enabled"),
        (TextEntry::Auto, false) => Check::warn(
            "text entry",
            "ADB Keyboard not enabled; non-ASCII messages cannot be typed",
        ),
        (TextEntry::AdbKeyboard, false) => Check::fail("text entry", "ADB Keyboard not enabled"),
    }
}
