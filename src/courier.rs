//! One automation run: launch, resolve, settle, deliver, report.
//!
//! CHANGELOG:
//! - 10/18/2026 - Suggestions for unresolved contacts
//! - 10/18/2026 - Initial implementation

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::delivery::{DeliveryDriver, DeliveryOutcome};
use crate::device::DeviceSurface;
use crate::error::Result;
use crate::resolver::{ContactResolver, Resolution, ResolutionResult, Target};
use crate::scraper::ScreenScraper;
use crate::suggest::{suggest, Suggestion};
use crate::timing::Pause;

/// Suggestions shown for an unresolved contact.
const MAX_SUGGESTIONS: usize = 3;

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Sent,
    ContactNotFound,
    InputNotFound,
    SendControlNotFound,
}

impl From<DeliveryOutcome> for RunStatus {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Sent => RunStatus::Sent,
            DeliveryOutcome::InputNotFound => RunStatus::InputNotFound,
            DeliveryOutcome::SendControlNotFound => RunStatus::SendControlNotFound,
        }
    }
}

/// Everything the operator needs to know about one run.
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub run_id: Uuid,
    pub contact: String,
    pub message: String,
    pub package: String,
    pub status: RunStatus,
    pub resolution: Option<Resolution>,
    pub delivery: Option<DeliveryOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SendReport {
    pub fn is_sent(&self) -> bool {
        self.status == RunStatus::Sent
    }

    /// One human-readable line.
    pub fn status_line(&self) -> String {
        match (&self.status, &self.resolution) {
            (RunStatus::Sent, Some(r)) => format!(
                "Message sent to {} (found by {}{})",
                self.contact,
                r.strategy.as_str(),
                if r.swipes > 0 {
                    format!(" after {} swipe(s)", r.swipes)
                } else {
                    String::new()
                }
            ),
            (RunStatus::Sent, None) => format!("Message sent to {}", self.contact),
            (RunStatus::ContactNotFound, _) => {
                let mut line = format!("Contact '{}' not found", self.contact);
                if !self.suggestions.is_empty() {
                    let names: Vec<&str> = self.suggestions.iter().map(|s| s.name.as_str()).collect();
                    line.push_str(&format!(" (did you mean: {}?)", names.join(", ")));
                }
                line
            }
            (RunStatus::InputNotFound, _) => {
                format!("Opened {} but no message input accepted the text", self.contact)
            }
            (RunStatus::SendControlNotFound, _) => {
                format!("Typed the message to {} but could not send it", self.contact)
            }
        }
    }
}

/// Drives one device through a run.
pub struct Courier<'a> {
    surface: &'a mut dyn DeviceSurface,
    config: &'a Config,
    pause: &'a dyn Pause,
}

impl<'a> Courier<'a> {
    pub fn new(surface: &'a mut dyn DeviceSurface, config: &'a Config, pause: &'a dyn Pause) -> Self {
        Self {
            surface,
            config,
            pause,
        }
    }

    pub fn surface(&mut self) -> &mut dyn DeviceSurface {
        &mut *self.surface
    }

    /// Start the target app and wait for it to draw.
    pub fn launch(&mut self) -> Result<()> {
        let package = &self.config.app.package;
        info!(package, "launching app");
        self.surface.app_start(package)?;
        self.pause.pause(self.config.timing.launch_settle());
        Ok(())
    }

    /// Resolve `target` and deliver `message`.
    ///
    /// Contact or control misses are reported in the returned report. Only a
    /// lost device is an error.
    pub fn send(&mut self, target: &Target, message: &str) -> Result<SendReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        let _enter = span.enter();
        let started_at = Utc::now();

        let resolver = ContactResolver::new(&self.config.resolver, &self.config.timing, self.pause);
        let resolution = resolver.resolve_target(&mut *self.surface, target)?;

        let (status, resolution, delivery, suggestions) = match resolution {
            ResolutionResult::Resolved(resolution) => {
                self.pause.pause(self.config.timing.conversation_settle());
                let driver = DeliveryDriver::new(&self.config.delivery, &self.config.timing, self.pause);
                let outcome = driver.deliver(&mut *self.surface, message)?;
                (RunStatus::from(outcome), Some(resolution), Some(outcome), Vec::new())
            }
            ResolutionResult::NotFound => {
                let suggestions = self.suggestions_for(target.name());
                (RunStatus::ContactNotFound, None, None, suggestions)
            }
        };

        Ok(SendReport {
            run_id,
            contact: target.name().to_string(),
            message: message.to_string(),
            package: self.config.app.package.clone(),
            status,
            resolution,
            delivery,
            suggestions,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn suggestions_for(&mut self, name: &str) -> Vec<Suggestion> {
        let scraper = ScreenScraper::new(&self.config.scraper);
        let on_screen = scraper.plausible_contacts(&scraper.scrape(&mut *self.surface));
        suggest(name, on_screen.iter().map(|c| c.text.as_str()), MAX_SUGGESTIONS)
    }
}
