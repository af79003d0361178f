//! In-memory widget tree for engine tests.
//!
//! Screens are plain element lists. Swipes advance through scripted pages,
//! clicks and typed text can swap in a new screen, and every action is
//! recorded for assertions.

use std::collections::VecDeque;
use std::time::Duration;

use super::{Bounds, DeviceSurface, Key, Point, ScreenElement, Selector};
use crate::error::{CourierError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AppStart(String),
    Click(ScreenElement),
    SetText { target: ScreenElement, value: String },
    PressKey(Key),
    Swipe { from: Point, to: Point, duration: Duration },
}

pub fn text_view(text: &str) -> ScreenElement {
    ScreenElement {
        text: text.to_string(),
        class_name: "android.widget.TextView".to_string(),
        ..Default::default()
    }
}

pub fn edit_text() -> ScreenElement {
    ScreenElement {
        class_name: "android.widget.EditText".to_string(),
        ..Default::default()
    }
}

pub fn with_description(description: &str, class: &str) -> ScreenElement {
    ScreenElement {
        description: description.to_string(),
        class_name: class.to_string(),
        ..Default::default()
    }
}

pub fn with_resource_id(resource_id: &str, class: &str) -> ScreenElement {
    ScreenElement {
        resource_id: resource_id.to_string(),
        class_name: class.to_string(),
        ..Default::default()
    }
}

/// Number the elements and stack them vertically so each has real bounds.
fn layout(elements: Vec<ScreenElement>) -> Vec<ScreenElement> {
    elements
        .into_iter()
        .enumerate()
        .map(|(i, mut el)| {
            let top = 100 * i as i32;
            el.index = i;
            el.bounds = Bounds::new(0, top, 1080, top + 90);
            el
        })
        .collect()
}

#[derive(Debug)]
pub struct FakeSurface {
    screen: Vec<ScreenElement>,
    swipe_pages: VecDeque<Vec<ScreenElement>>,
    click_transitions: Vec<(Selector, Vec<ScreenElement>)>,
    text_transitions: Vec<(String, Vec<ScreenElement>)>,
    failing_clicks: Vec<Selector>,
    failing_text: Vec<Selector>,
    failing_keys: bool,
    failing_queries: bool,
    disconnected: bool,
    size: (u32, u32),
    pub actions: Vec<Action>,
    pub queries: Vec<Selector>,
}

impl FakeSurface {
    pub fn new(screen: Vec<ScreenElement>) -> Self {
        Self {
            screen: layout(screen),
            swipe_pages: VecDeque::new(),
            click_transitions: Vec::new(),
            text_transitions: Vec::new(),
            failing_clicks: Vec::new(),
            failing_text: Vec::new(),
            failing_keys: false,
            failing_queries: false,
            disconnected: false,
            size: (1080, 2000),
            actions: Vec::new(),
            queries: Vec::new(),
        }
    }

    /// Each swipe replaces the screen with the next page; once pages run out
    /// the screen stays put.
    pub fn with_swipe_pages(mut self, pages: Vec<Vec<ScreenElement>>) -> Self {
        self.swipe_pages = pages.into_iter().map(layout).collect();
        self
    }

    /// Clicking an element matching `selector` navigates to `screen`.
    pub fn on_click(mut self, selector: Selector, screen: Vec<ScreenElement>) -> Self {
        self.click_transitions.push((selector, layout(screen)));
        self
    }

    /// Typing exactly `value` anywhere navigates to `screen`.
    pub fn on_text(mut self, value: &str, screen: Vec<ScreenElement>) -> Self {
        self.text_transitions.push((value.to_string(), layout(screen)));
        self
    }

    pub fn failing_click(mut self, selector: Selector) -> Self {
        self.failing_clicks.push(selector);
        self
    }

    /// Typing into an element matching `selector` fails.
    pub fn failing_text(mut self, selector: Selector) -> Self {
        self.failing_text.push(selector);
        self
    }

    pub fn failing_keys(mut self) -> Self {
        self.failing_keys = true;
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.failing_queries = true;
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.disconnected = true;
        self
    }

    pub fn swipes(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Swipe { .. }))
            .count()
    }

    pub fn clicked(&self) -> Vec<ScreenElement> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Click(el) => Some(el.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn typed(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::SetText { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::PressKey(k) => Some(*k),
                _ => None,
            })
            .collect()
    }

    fn check_connected(&self) -> Result<()> {
        if self.disconnected {
            Err(CourierError::DeviceUnavailable("fake device disconnected".into()))
        } else {
            Ok(())
        }
    }
}

impl DeviceSurface for FakeSurface {
    fn app_start(&mut self, package: &str) -> Result<()> {
        self.check_connected()?;
        self.actions.push(Action::AppStart(package.to_string()));
        Ok(())
    }

    fn find(&mut self, selector: &Selector) -> Result<Vec<ScreenElement>> {
        self.check_connected()?;
        self.queries.push(selector.clone());
        if self.failing_queries {
            return Err(CourierError::action_failed("query", "uiautomator dump timed out"));
        }
        Ok(self
            .screen
            .iter()
            .filter(|el| el.matches(selector))
            .cloned()
            .collect())
    }

    fn click(&mut self, element: &ScreenElement) -> Result<()> {
        self.check_connected()?;
        if self.failing_clicks.iter().any(|s| element.matches(s)) {
            return Err(CourierError::action_failed("click", "stale element"));
        }
        self.actions.push(Action::Click(element.clone()));
        let next = self
            .click_transitions
            .iter()
            .find(|(s, _)| element.matches(s))
            .map(|(_, screen)| screen.clone());
        if let Some(screen) = next {
            self.screen = screen;
        }
        Ok(())
    }

    fn set_text(&mut self, element: &ScreenElement, value: &str) -> Result<()> {
        self.check_connected()?;
        if self.failing_text.iter().any(|s| element.matches(s)) {
            return Err(CourierError::action_failed("set text", "input rejected"));
        }
        self.actions.push(Action::SetText {
            target: element.clone(),
            value: value.to_string(),
        });
        let next = self
            .text_transitions
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, screen)| screen.clone());
        if let Some(screen) = next {
            self.screen = screen;
        }
        Ok(())
    }

    fn press_key(&mut self, key: Key) -> Result<()> {
        self.check_connected()?;
        if self.failing_keys {
            return Err(CourierError::action_failed("press key", "injection refused"));
        }
        self.actions.push(Action::PressKey(key));
        Ok(())
    }

    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> Result<()> {
        self.check_connected()?;
        self.actions.push(Action::Swipe { from, to, duration });
        if let Some(page) = self.swipe_pages.pop_front() {
            self.screen = page;
        }
        Ok(())
    }

    fn window_size(&mut self) -> Result<(u32, u32)> {
        self.check_connected()?;
        Ok(self.size)
    }
}
