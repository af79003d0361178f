//! Device Surface: the widget tree of the connected device's foreground screen.
//!
//! The engine only talks to [`DeviceSurface`]. `adb` is the production backend,
//! `fake` is an in-memory widget tree for tests.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial capability trait and element model

pub mod adb;
pub mod hierarchy;

#[cfg(test)]
pub mod fake;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// How to address a widget. Every variant is an exact string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    Text(String),
    Description(String),
    ResourceId(String),
    ClassName(String),
}

impl Selector {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn description(value: impl Into<String>) -> Self {
        Self::Description(value.into())
    }

    pub fn resource_id(value: impl Into<String>) -> Self {
        Self::ResourceId(value.into())
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::ClassName(value.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "text={:?}", v),
            Self::Description(v) => write!(f, "description={:?}", v),
            Self::ResourceId(v) => write!(f, "resource-id={:?}", v),
            Self::ClassName(v) => write!(f, "class={:?}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle, `[left,top][right,bottom]` as uiautomator reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// Hardware/soft keys the engine may press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Back,
    Home,
    Search,
    Delete,
}

impl Key {
    /// Android keycode name for `input keyevent`.
    pub fn keycode(&self) -> &'static str {
        match self {
            Key::Enter => "KEYCODE_ENTER",
            Key::Back => "KEYCODE_BACK",
            Key::Home => "KEYCODE_HOME",
            Key::Search => "KEYCODE_SEARCH",
            Key::Delete => "KEYCODE_DEL",
        }
    }
}

/// One widget of the current screen.
///
/// A snapshot taken by a single query. It is only meaningful until the
/// foreground screen changes; never keep one across a navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScreenElement {
    /// Position in document order of the dump that produced it.
    pub index: usize,
    pub text: String,
    pub description: String,
    pub resource_id: String,
    pub class_name: String,
    pub bounds: Bounds,
}

impl ScreenElement {
    pub fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Text(v) => self.text == *v,
            Selector::Description(v) => self.description == *v,
            Selector::ResourceId(v) => self.resource_id == *v,
            Selector::ClassName(v) => self.class_name == *v,
        }
    }

    /// Short human label for logs.
    pub fn label(&self) -> String {
        if !self.text.is_empty() {
            format!("{:?}", self.text)
        } else if !self.description.is_empty() {
            format!("desc {:?}", self.description)
        } else if !self.resource_id.is_empty() {
            self.resource_id.clone()
        } else {
            format!("{}#{}", self.class_name, self.index)
        }
    }
}

/// Capability set of a connected device.
///
/// Queries always read the live tree. Actions return `ActionFailed` when the
/// call itself errors and `DeviceUnavailable` when the connection is gone.
pub trait DeviceSurface {
    /// Launch an app by package id.
    fn app_start(&mut self, package: &str) -> Result<()>;

    /// All widgets matching `selector`, in the order the surface reports them.
    fn find(&mut self, selector: &Selector) -> Result<Vec<ScreenElement>>;

    fn click(&mut self, element: &ScreenElement) -> Result<()>;

    /// Focus `element` and type `value` into it.
    fn set_text(&mut self, element: &ScreenElement, value: &str) -> Result<()>;

    fn press_key(&mut self, key: Key) -> Result<()>;

    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> Result<()>;

    /// Screen size in pixels as `(width, height)`.
    fn window_size(&mut self) -> Result<(u32, u32)>;

    /// First widget matching `selector`, if any.
    fn find_first(&mut self, selector: &Selector) -> Result<Option<ScreenElement>> {
        Ok(self.find(selector)?.into_iter().next())
    }

    fn exists(&mut self, selector: &Selector) -> Result<bool> {
        Ok(self.find_first(selector)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(text: &str, class: &str) -> ScreenElement {
        ScreenElement {
            text: text.to_string(),
            class_name: class.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_selector_matches_exactly() {
        let el = element("Alice", "android.widget.TextView");
        assert!(el.matches(&Selector::text("Alice")));
        assert!(!el.matches(&Selector::text("alice")));
        assert!(!el.matches(&Selector::text("Alice ")));
        assert!(el.matches(&Selector::class_name("android.widget.TextView")));
        assert!(!el.matches(&Selector::description("Alice")));
    }

    #[test]
    fn test_bounds_center() {
        let b = Bounds::new(0, 100, 200, 300);
        assert_eq!(b.center(), Point::new(100, 200));
        assert!(!b.is_empty());
        assert!(Bounds::default().is_empty());
    }

    #[test]
    fn test_selector_config_shape() {
        let sel: Selector = serde_json::from_str(r#"{"resource_id": "com.tencent.mm:id/iw"}"#).unwrap();
        assert_eq!(sel, Selector::resource_id("com.tencent.mm:id/iw"));
        let key: Key = serde_json::from_str(r#""enter""#).unwrap();
        assert_eq!(key.keycode(), "KEYCODE_ENTER");
    }

    #[test]
    fn test_default_lookups() {
        use crate::device::fake::{text_view, FakeSurface};

        let mut surface = FakeSurface::new(vec![text_view("Sam"), text_view("Sam")]);
        assert_eq!(surface.find_first(&Selector::text("Sam")).unwrap().map(|e| e.index), Some(0));
        assert!(surface.exists(&Selector::text("Sam")).unwrap());
        assert!(!surface.exists(&Selector::text("Pat")).unwrap());
        assert!(FakeSurface::new(vec![]).disconnected().exists(&Selector::text("Sam")).is_err());
    }

    #[test]
    fn test_label_prefers_text() {
        let mut el = element("", "android.widget.EditText");
        el.index = 7;
        assert_eq!(el.label(), "android.widget.EditText#7");
        el.description = "输入框".into();
        assert_eq!(el.label(), "desc \"输入框\"");
    }
}
