//! ADB-backed Device Surface.
//!
//! Shells out to `adb`: build a command line, run it, map a non-zero exit to an
//! error. Every query re-dumps the window hierarchy, so elements never outlive
//! the screen they came from.
//!
//! CHANGELOG:
//! - 10/18/2026 - ADB Keyboard broadcast for non-ASCII text
//! - 10/18/2026 - Initial implementation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::process::Command;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, trace};

use super::hierarchy::parse_hierarchy;
use super::{DeviceSurface, Key, Point, ScreenElement, Selector};
use crate::error::{CourierError, Result};

/// Where uiautomator writes the hierarchy on the device.
const DUMP_PATH: &str = "/sdcard/window_dump.xml";

/// IME id of the ADB Keyboard app.
pub const ADB_KEYBOARD_IME: &str = "com.android.adbkeyboard/.AdbIME";

/// How text reaches the focused input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEntry {
    /// `input text` for ASCII, ADB Keyboard for everything else.
    #[default]
    Auto,
    /// Always `input text` (ASCII only).
    Input,
    /// Always the ADB Keyboard broadcast.
    AdbKeyboard,
}

impl TextEntry {
    fn for_text(self, text: &str) -> TextEntry {
        match self {
            TextEntry::Auto if text.is_ascii() => TextEntry::Input,
            TextEntry::Auto => TextEntry::AdbKeyboard,
            other => other,
        }
    }
}

/// Quote a string for the device's `sh`.
///
/// Single quotes cannot be escaped inside single quotes, so each one closes the
/// quoted run, emits an escaped quote, and reopens it.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Encode text for `input text`, which reads `%s` as a space.
pub fn encode_input_text(s: &str) -> String {
    s.replace(' ', "%s")
}

/// Parse `wm size` output. An override size wins over the physical size.
pub fn parse_wm_size(output: &str) -> Option<(u32, u32)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(Physical|Override) size:\s*(\d+)x(\d+)").expect("valid wm size regex")
    });

    let mut physical = None;
    let mut over = None;
    for caps in re.captures_iter(output) {
        let size: (u32, u32) = (caps[2].parse().ok()?, caps[3].parse().ok()?);
        if &caps[1] == "Override" {
            over = Some(size);
        } else {
            physical = Some(size);
        }
    }
    over.or(physical)
}

/// Parse `adb devices` into `(serial, state)` pairs.
pub fn parse_devices(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .skip_while(|line| !line.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            Some((parts.next()?.to_string(), parts.next()?.to_string()))
        })
        .collect()
}

/// Decide whether an adb failure means the device is gone.
fn classify_failure(action: &str, stderr: &str) -> CourierError {
    let lower = stderr.to_lowercase();
    let connectivity = [
        "no devices/emulators found",
        "device offline",
        "unauthorized",
        "still authorizing",
        "cannot connect",
        "closed",
    ];
    // `error: device 'SERIAL' not found`, not a shell's `sh: input: not found`
    let missing_serial = lower.contains("device '") && lower.contains("' not found");
    if missing_serial || connectivity.iter().any(|needle| lower.contains(needle)) {
        CourierError::DeviceUnavailable(stderr.trim().to_string())
    } else {
        CourierError::action_failed(action, stderr.trim())
    }
}

/// Device Surface over the `adb` binary.
#[derive(Debug, Clone)]
pub struct AdbDevice {
    adb_path: String,
    serial: Option<String>,
    text_entry: TextEntry,
}

impl AdbDevice {
    pub fn new(adb_path: impl Into<String>, serial: Option<String>, text_entry: TextEntry) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial,
            text_entry,
        }
    }

    /// Create a device handle and check that the device answers.
    pub fn connect(
        adb_path: impl Into<String>,
        serial: Option<String>,
        text_entry: TextEntry,
    ) -> Result<Self> {
        let device = Self::new(adb_path, serial, text_entry);
        let state = device.run("get-state", &["get-state"])?;
        if state.trim() != "device" {
            return Err(CourierError::DeviceUnavailable(format!(
                "device state is '{}'",
                state.trim()
            )));
        }
        Ok(device)
    }

    /// `adb version`, first line.
    pub fn version(&self) -> Result<String> {
        let out = self.run_global("version", &["version"])?;
        Ok(out.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Attached devices as `(serial, state)`.
    pub fn devices(&self) -> Result<Vec<(String, String)>> {
        Ok(parse_devices(&self.run_global("devices", &["devices"])?))
    }

    pub fn model(&self) -> Result<String> {
        Ok(self.shell("getprop", "getprop ro.product.model")?.trim().to_string())
    }

    pub fn package_installed(&self, package: &str) -> Result<bool> {
        let out = self.shell(
            "pm list packages",
            &format!("pm list packages {}", shell_quote(package)),
        )?;
        let wanted = format!("package:{}", package);
        Ok(out.lines().any(|line| line.trim() == wanted))
    }

    /// Enabled input methods.
    pub fn input_methods(&self) -> Result<Vec<String>> {
        let out = self.shell("ime list", "ime list -s")?;
        Ok(out.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect())
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.adb_path);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd
    }

    /// Run an adb command against the selected device.
    fn run(&self, action: &str, args: &[&str]) -> Result<String> {
        let mut cmd = self.base_command();
        cmd.args(args);
        Self::execute(action, cmd)
    }

    /// Run an adb command that does not target a device.
    fn run_global(&self, action: &str, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.adb_path);
        cmd.args(args);
        Self::execute(action, cmd)
    }

    fn execute(action: &str, mut cmd: Command) -> Result<String> {
        trace!(?cmd, "adb");
        let output = cmd.output().map_err(|e| {
            CourierError::DeviceUnavailable(format!("failed to run {:?}: {}", cmd.get_program(), e))
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).into_owned()
            } else {
                stderr.into_owned()
            };
            Err(classify_failure(action, &detail))
        }
    }

    fn shell(&self, action: &str, command: &str) -> Result<String> {
        self.run(action, &["shell", command])
    }

    fn dump(&mut self) -> Result<Vec<ScreenElement>> {
        let out = self.shell("uiautomator dump", &format!("uiautomator dump {}", DUMP_PATH))?;
        if out.contains("ERROR") {
            return Err(CourierError::action_failed("uiautomator dump", out.trim()));
        }
        let xml = self.run("read dump", &["exec-out", "cat", DUMP_PATH])?;
        let nodes = parse_hierarchy(&xml);
        debug!(nodes = nodes.len(), "dumped window hierarchy");
        Ok(nodes)
    }

    fn type_text(&self, value: &str) -> Result<()> {
        match self.text_entry.for_text(value) {
            TextEntry::AdbKeyboard => {
                self.shell("clear text", "am broadcast -a ADB_CLEAR_TEXT")?;
                self.shell(
                    "set text",
                    &format!("am broadcast -a ADB_INPUT_TEXT --es msg {}", shell_quote(value)),
                )?;
            }
            _ => {
                self.shell(
                    "set text",
                    &format!("input text {}", shell_quote(&encode_input_text(value))),
                )?;
            }
        }
        Ok(())
    }
}

impl DeviceSurface for AdbDevice {
    fn app_start(&mut self, package: &str) -> Result<()> {
        let out = self
            .shell(
                "app start",
                &format!(
                    "monkey -p {} -c android.intent.category.LAUNCHER 1",
                    shell_quote(package)
                ),
            )
            .map_err(|e| CourierError::DeviceUnavailable(format!("cannot launch {}: {}", package, e)))?;
        if out.contains("No activities found") || out.contains("monkey aborted") {
            return Err(CourierError::DeviceUnavailable(format!(
                "cannot launch {}: {}",
                package,
                out.trim()
            )));
        }
        Ok(())
    }

    fn find(&mut self, selector: &Selector) -> Result<Vec<ScreenElement>> {
        let matches: Vec<ScreenElement> = self
            .dump()?
            .into_iter()
            .filter(|el| el.matches(selector))
            .collect();
        debug!(%selector, found = matches.len(), "query");
        Ok(matches)
    }

    fn click(&mut self, element: &ScreenElement) -> Result<()> {
        if element.bounds.is_empty() {
            return Err(CourierError::action_failed(
                "click",
                format!("{} has no on-screen bounds", element.label()),
            ));
        }
        let center = element.bounds.center();
        self.shell("click", &format!("input tap {} {}", center.x, center.y))?;
        Ok(())
    }

    fn set_text(&mut self, element: &ScreenElement, value: &str) -> Result<()> {
        self.click(element)?;
        if value.is_empty() {
            return Ok(());
        }
        self.type_text(value)
    }

    fn press_key(&mut self, key: Key) -> Result<()> {
        self.shell("press key", &format!("input keyevent {}", key.keycode()))?;
        Ok(())
    }

    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> Result<()> {
        self.shell(
            "swipe",
            &format!(
                "input swipe {} {} {} {} {}",
                from.x,
                from.y,
                to.x,
                to.y,
                duration.as_millis()
            ),
        )?;
        Ok(())
    }

    fn window_size(&mut self) -> Result<(u32, u32)> {
        let out = self.shell("window size", "wm size")?;
        parse_wm_size(&out)
            .ok_or_else(|| CourierError::action_failed("window size", format!("unexpected output: {}", out.trim())))
    }
}
