//! Message Delivery Driver: type into the conversation input and send.
//!
//! `Sent` means every action issued landed on an element that existed. The
//! target app's delivery receipts are not checked.
//!
//! CHANGELOG:
//! - 10/18/2026 - An input that refuses the text falls through to the next locator
//! - 10/18/2026 - Initial implementation

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::{DeliveryConfig, Timing};
use crate::device::{DeviceSurface, ScreenElement, Selector};
use crate::error::Result;
use crate::timing::Pause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    InputNotFound,
    SendControlNotFound,
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::InputNotFound => "no usable message input",
            DeliveryOutcome::SendControlNotFound => "send control not found",
        };
        f.write_str(s)
    }
}

pub struct DeliveryDriver<'a> {
    config: &'a DeliveryConfig,
    timing: &'a Timing,
    pause: &'a dyn Pause,
}

impl<'a> DeliveryDriver<'a> {
    pub fn new(config: &'a DeliveryConfig, timing: &'a Timing, pause: &'a dyn Pause) -> Self {
        Self {
            config,
            timing,
            pause,
        }
    }

    /// Type `message` into the conversation input and send it.
    ///
    /// Call only once the conversation screen has settled. Returns an error
    /// only when the device is gone.
    pub fn deliver(&self, surface: &mut dyn DeviceSurface, message: &str) -> Result<DeliveryOutcome> {
        if !self.type_message(surface, message)? {
            return Ok(DeliveryOutcome::InputNotFound);
        }
        self.pause.pause(self.timing.send_settle());

        let outcome = self.trigger_send(surface)?;
        info!(%outcome, chars = message.chars().count(), "delivery finished");
        Ok(outcome)
    }

    /// Type into the first input, in locator order, that exists, takes focus
    /// and accepts the text. False when none did.
    fn type_message(&self, surface: &mut dyn DeviceSurface, message: &str) -> Result<bool> {
        let mut focused_any = false;
        for locator in &self.config.input_locators {
            let Some(input) = self.focus_input(surface, locator)? else {
                continue;
            };
            focused_any = true;
            self.pause.pause(self.timing.input_focus());
            match surface.set_text(&input, message) {
                Ok(()) => return Ok(true),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(%locator, error = %e, "typing into message input failed"),
            }
        }

        if focused_any {
            warn!("message input found but it did not accept the text");
        } else {
            warn!("no message input matched any locator");
        }
        Ok(false)
    }

    fn focus_input(&self, surface: &mut dyn DeviceSurface, locator: &Selector) -> Result<Option<ScreenElement>> {
        let found = match surface.find_first(locator) {
            Ok(found) => found,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(%locator, error = %e, "input query failed");
                return Ok(None);
            }
        };
        let Some(element) = found else {
            debug!(%locator, "input locator missed");
            return Ok(None);
        };
        match surface.click(&element) {
            Ok(()) => {
                debug!(%locator, "message input focused");
                Ok(Some(element))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(%locator, error = %e, "could not focus input");
                Ok(None)
            }
        }
    }

    fn trigger_send(&self, surface: &mut dyn DeviceSurface) -> Result<DeliveryOutcome> {
        let send = match surface.find_first(&self.config.send_control) {
            Ok(found) => found,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "send control query failed");
                None
            }
        };

        if let Some(control) = send {
            match surface.click(&control) {
                Ok(()) => return Ok(DeliveryOutcome::Sent),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(error = %e, "send control click failed"),
            }
        }

        let Some(key) = self.config.fallback_key else {
            return Ok(DeliveryOutcome::SendControlNotFound);
        };
        debug!(?key, "falling back to key press");
        match surface.press_key(key) {
            Ok(()) => Ok(DeliveryOutcome::Sent),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "fallback key press failed");
                Ok(DeliveryOutcome::SendControlNotFound)
            }
        }
    }
}
