//! Configuration: target app profile, locators, delays, swipe bounds.
//!
//! Every field has a default matching the WeChat profile, so a config file only
//! needs the values it changes.
//!
//! CHANGELOG:
//! - 10/18/2026 - Validation of swipe fractions and display windows
//! - 10/18/2026 - Initial implementation

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::device::adb::TextEntry;
use crate::device::{Key, Selector};

/// Env var pointing at a config file.
pub const CONFIG_ENV: &str = "COURIER_CONFIG_PATH";

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    UserDir(PathBuf),
    Defaults,
}

/// Per-user config file location.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("contact-courier").join("config.json"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub device: DeviceConfig,
    pub timing: Timing,
    pub scraper: ScraperConfig,
    pub resolver: ResolverConfig,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Package id launched before each run.
    pub package: String,
    /// Sent when the operator leaves the message prompt empty.
    pub default_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            package: "com.tencent.mm".to_string(),
            default_message: "你好！".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub adb_path: String,
    pub serial: Option<String>,
    pub text_entry: TextEntry,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: "adb".to_string(),
            serial: None,
            text_entry: TextEntry::Auto,
        }
    }
}

/// Settle delays in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub launch_settle_ms: u64,
    pub search_open_ms: u64,
    pub search_results_ms: u64,
    pub swipe_settle_ms: u64,
    pub conversation_settle_ms: u64,
    pub input_focus_ms: u64,
    pub send_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            launch_settle_ms: 8000,
            search_open_ms: 2000,
            search_results_ms: 3000,
            swipe_settle_ms: 2000,
            conversation_settle_ms: 3000,
            input_focus_ms: 1000,
            send_settle_ms: 1000,
        }
    }
}

impl Timing {
    pub fn launch_settle(&self) -> Duration {
        Duration::from_millis(self.launch_settle_ms)
    }

    pub fn search_open(&self) -> Duration {
        Duration::from_millis(self.search_open_ms)
    }

    pub fn search_results(&self) -> Duration {
        Duration::from_millis(self.search_results_ms)
    }

    pub fn swipe_settle(&self) -> Duration {
        Duration::from_millis(self.swipe_settle_ms)
    }

    pub fn conversation_settle(&self) -> Duration {
        Duration::from_millis(self.conversation_settle_ms)
    }

    pub fn input_focus(&self) -> Duration {
        Duration::from_millis(self.input_focus_ms)
    }

    pub fn send_settle(&self) -> Duration {
        Duration::from_millis(self.send_settle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Widget class that carries display text.
    pub text_class: String,
    /// Shorter text is dropped from every scrape.
    pub min_text_chars: usize,
    /// Plausible names are shorter than this.
    pub max_name_chars: usize,
    /// Rows shown by the raw screen listing.
    pub listing_limit: usize,
    /// Rows shown by the plausible-contact listing.
    pub candidate_limit: usize,
    /// UI chrome that is never a contact name (compared case-insensitively).
    pub chrome_labels: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            text_class: "android.widget.TextView".to_string(),
            min_text_chars: 2,
            max_name_chars: 20,
            listing_limit: 25,
            candidate_limit: 20,
            chrome_labels: ["微信", "通讯录", "发现", "我", "搜索", "WeChat", "Chats", "Contacts", "Discover", "Me", "Search"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Search affordance locators, tried in order.
    pub search_locators: Vec<Selector>,
    /// Text entry on the search screen.
    pub search_input: Selector,
    /// Swipe start, as a fraction of screen height.
    pub swipe_start: f64,
    /// Swipe end, as a fraction of screen height.
    pub swipe_end: f64,
    pub swipe_duration_ms: u64,
    pub max_swipes: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_locators: vec![
                Selector::text("搜索"),
                Selector::description("搜索"),
                Selector::resource_id("com.tencent.mm:id/iw"),
            ],
            search_input: Selector::class_name("android.widget.EditText"),
            swipe_start: 0.7,
            swipe_end: 0.3,
            swipe_duration_ms: 500,
            max_swipes: 5,
        }
    }
}

impl ResolverConfig {
    pub fn swipe_duration(&self) -> Duration {
        Duration::from_millis(self.swipe_duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Message input locators, tried in order.
    pub input_locators: Vec<Selector>,
    pub send_control: Selector,
    /// Pressed when the send control is missing. `null` disables the fallback.
    pub fallback_key: Option<Key>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            input_locators: vec![
                Selector::class_name("android.widget.EditText"),
                Selector::description("输入框"),
                Selector::resource_id("com.tencent.mm:id/anv"),
            ],
            send_control: Selector::text("发送"),
            fallback_key: Some(Key::Enter),
        }
    }
}

impl Config {
    /// Load a config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config to use.
    ///
    /// Order of lookup:
    /// 1. Explicit path (`--config`)
    /// 2. COURIER_CONFIG_PATH env var
    /// 3. `<config dir>/contact-courier/config.json`, if it exists
    /// 4. Built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, ConfigSource::Flag(path.to_path_buf())));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, ConfigSource::Env(path)));
        }

        if let Some(path) = user_config_path() {
            if path.exists() {
                return Ok((Self::load(&path)?, ConfigSource::UserDir(path)));
            }
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    pub fn validate(&self) -> Result<()> {
        let r = &self.resolver;
        ensure!(
            r.swipe_start > 0.0 && r.swipe_start < 1.0 && r.swipe_end > 0.0 && r.swipe_end < 1.0,
            "swipe fractions must be between 0 and 1 (got {} -> {})",
            r.swipe_start,
            r.swipe_end
        );
        ensure!(
            r.swipe_start > r.swipe_end,
            "swipe_start ({}) must be greater than swipe_end ({})",
            r.swipe_start,
            r.swipe_end
        );
        ensure!(
            self.scraper.listing_limit > 0 && self.scraper.candidate_limit > 0,
            "display windows must show at least one row"
        );
        ensure!(
            self.scraper.min_text_chars < self.scraper.max_name_chars,
            "min_text_chars must be smaller than max_name_chars"
        );
        ensure!(!self.app.package.trim().is_empty(), "app.package is empty");
        Ok(())
    }

    /// adb binary path with `~` expanded.
    pub fn adb_path(&self) -> String {
        shellexpand::tilde(&self.device.adb_path).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.resolver.max_swipes, 5);
        assert_eq!(config.scraper.candidate_limit, 20);
        assert_eq!(config.delivery.fallback_key, Some(Key::Enter));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"app": {{"package": "org.telegram.messenger"}}, "resolver": {{"max_swipes": 8}}}}"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.app.package, "org.telegram.messenger");
        assert_eq!(config.app.default_message, "你好！");
        assert_eq!(config.resolver.max_swipes, 8);
        assert_eq!(config.resolver.swipe_start, 0.7);
        assert_eq!(config.timing.launch_settle_ms, 8000);
    }

    #[test]
    fn test_locators_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"delivery": {"input_locators": [{"description": "Message"}], "send_control": {"text": "Send"}, "fallback_key": null}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.delivery.input_locators, vec![Selector::description("Message")]);
        assert_eq!(config.delivery.send_control, Selector::text("Send"));
        assert_eq!(config.delivery.fallback_key, None);
    }

    #[test]
    fn test_inverted_swipe_rejected() {
        let mut config = Config::default();
        config.resolver.swipe_start = 0.3;
        config.resolver.swipe_end = 0.7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.scraper.candidate_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, "{}").unwrap();
        let (_, source) = Config::discover(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::Flag(path));
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let err = Config::discover(Some(Path::new("/nonexistent/courier.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_adb_path_expands_tilde() {
        let mut config = Config::default();
        config.device.adb_path = "~/platform-tools/adb".to_string();
        if dirs::home_dir().is_some() {
            assert!(!config.adb_path().starts_with('~'));
        }
    }
}
