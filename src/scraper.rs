//! Screen Scraper: visible text of the foreground screen.
//!
//! Two views of the same scrape:
//! - every distinct label (used for the raw screen listing and suggestions)
//! - plausible contact names, after the noise filter (used for picking)
//!
//! CHANGELOG:
//! - 10/18/2026 - Non-ASCII digit counters count as noise
//! - 10/18/2026 - Length cap on plausible names
//! - 10/18/2026 - Initial implementation

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::device::{DeviceSurface, ScreenElement, Selector};
use crate::error::Result;

/// Normalized text of one widget, with the widget it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateText {
    pub text: String,
    #[serde(skip)]
    pub element: ScreenElement,
}

/// Rejects text that is UI chrome rather than a contact name.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    chrome_labels: HashSet<String>,
    max_chars: usize,
}

impl NoiseFilter {
    pub fn new<I, S>(chrome_labels: I, max_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            chrome_labels: chrome_labels
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
            max_chars,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(&config.chrome_labels, config.max_name_chars)
    }

    /// True when `text` could be a contact's display name.
    pub fn is_plausible_name(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || text.chars().count() >= self.max_chars {
            return false;
        }
        // Counters and unread badges
        if text.chars().all(char::is_numeric) {
            return false;
        }
        // Timestamps and "key: value" status lines
        if text.contains(':') || text.contains('：') {
            return false;
        }
        !self.chrome_labels.contains(&text.to_lowercase())
    }
}

pub struct ScreenScraper<'a> {
    config: &'a ScraperConfig,
    filter: NoiseFilter,
}

impl<'a> ScreenScraper<'a> {
    pub fn new(config: &'a ScraperConfig) -> Self {
        Self {
            config,
            filter: NoiseFilter::from_config(config),
        }
    }

    /// All distinct labels on screen, first-seen order.
    pub fn try_scrape(&self, surface: &mut dyn DeviceSurface) -> Result<Vec<CandidateText>> {
        let elements = surface.find(&Selector::ClassName(self.config.text_class.clone()))?;
        let candidates = normalize(elements, self.config.min_text_chars);
        debug!(count = candidates.len(), "scraped screen text");
        Ok(candidates)
    }

    /// Like [`try_scrape`](Self::try_scrape), but a failed query yields an
    /// empty list.
    pub fn scrape(&self, surface: &mut dyn DeviceSurface) -> Vec<CandidateText> {
        self.try_scrape(surface).unwrap_or_else(|e| {
            warn!(error = %e, "screen scrape failed");
            Vec::new()
        })
    }

    /// Labels that pass the noise filter, first-seen order.
    pub fn plausible_contacts(&self, candidates: &[CandidateText]) -> Vec<CandidateText> {
        candidates
            .iter()
            .filter(|c| self.filter.is_plausible_name(&c.text))
            .cloned()
            .collect()
    }
}

/// Trim, drop short text, dedupe by exact equality keeping the first element.
pub fn normalize(elements: Vec<ScreenElement>, min_chars: usize) -> Vec<CandidateText> {
    let mut seen = HashSet::new();
    elements
        .into_iter()
        .filter_map(|element| {
            let text = element.text.trim().to_string();
            if text.chars().count() < min_chars.max(1) || !seen.insert(text.clone()) {
                return None;
            }
            Some(CandidateText { text, element })
        })
        .collect()
}

/// The first `limit` rows, for display.
pub fn window(candidates: &[CandidateText], limit: usize) -> &[CandidateText] {
    &candidates[..candidates.len().min(limit)]
}
