//! Screen command: list the text currently on the device screen.
//!
//! CHANGELOG:
//! - 10/18/2026 - A failed screen read shows an empty list instead of aborting
//! - 10/18/2026 - Initial implementation

use anyhow::Result;
use serde::Serialize;
use std::process::ExitCode;

use super::connect;
use crate::config::Config;
use crate::device::DeviceSurface;
use crate::output::OutputControls;
use crate::prompt::render_numbered;
use crate::scraper::{CandidateText, ScreenScraper};

/// What `screen` shows.
#[derive(Debug, Serialize)]
pub struct Listing {
    pub candidates_only: bool,
    /// Rows before the display window was applied.
    pub total: usize,
    pub items: Vec<CandidateText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn run(config: &Config, candidates: bool, all: bool, output: &OutputControls) -> Result<ExitCode> {
    let mut device = connect(config)?;
    let listing = collect(&mut device, config, candidates, all)?;

    if output.json {
        output.print(&listing);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(error) = &listing.error {
        eprintln!("Could not read the screen: {}", error);
    }
    if listing.items.is_empty() {
        println!("No text found on screen.");
    } else {
        let title = if candidates { "Possible contacts" } else { "Text on screen" };
        println!("{} ({} of {}):", title, listing.items.len(), listing.total);
        print!("{}", render_numbered(&listing.items));
    }
    Ok(ExitCode::SUCCESS)
}

/// Scrape and window the screen text. Only a lost device is an error; any
/// other failed read yields an empty listing carrying the error.
pub fn collect(
    surface: &mut dyn DeviceSurface,
    config: &Config,
    candidates: bool,
    all: bool,
) -> Result<Listing> {
    let scraper = ScreenScraper::new(&config.scraper);
    let (mut items, error) = match scraper.try_scrape(surface) {
        Ok(items) => (items, None),
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    let limit = if candidates {
        items = scraper.plausible_contacts(&items);
        config.scraper.candidate_limit
    } else {
        config.scraper.listing_limit
    };

    let total = items.len();
    if !all {
        items.truncate(limit);
    }
    Ok(Listing {
        candidates_only: candidates,
        total,
        items,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::{text_view, FakeSurface};

    fn surface_with(n: usize) -> FakeSurface {
        let mut screen = vec![text_view("微信"), text_view("Alice"), text_view("Alice")];
        screen.extend((0..n).map(|i| text_view(&format!("Friend {}", i))));
        FakeSurface::new(screen)
    }

    #[test]
    fn test_listing_is_windowed_and_deduped() {
        let mut config = Config::default();
        config.scraper.listing_limit = 3;
        let mut surface = surface_with(5);

        let listing = collect(&mut surface, &config, false, false).unwrap();
        assert_eq!(listing.total, 7);
        let texts: Vec<&str> = listing.items.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["微信", "Alice", "Friend 0"]);
        assert!(listing.error.is_none());

        let listing = collect(&mut surface, &config, false, true).unwrap();
        assert_eq!(listing.items.len(), 7);
    }

    #[test]
    fn test_candidates_drop_chrome() {
        let config = Config::default();
        let mut surface = surface_with(1);
        let listing = collect(&mut surface, &config, true, false).unwrap();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.items[0].text, "Alice");
    }

    #[test]
    fn test_failed_read_gives_empty_listing() {
        let config = Config::default();
        let mut surface = FakeSurface::new(vec![text_view("Alice")]).failing_queries();
        let listing = collect(&mut surface, &config, false, false).unwrap();
        assert!(listing.items.is_empty());
        assert_eq!(listing.total, 0);
        assert!(listing.error.unwrap().contains("uiautomator dump timed out"));

        let value = serde_json::to_value(&collect(&mut surface, &config, true, false).unwrap()).unwrap();
        assert_eq!(value["items"], serde_json::json!([]));
        assert!(value["error"].is_string());
    }

    #[test]
    fn test_lost_device_is_an_error() {
        let config = Config::default();
        let mut surface = FakeSurface::new(vec![]).disconnected();
        assert!(collect(&mut surface, &config, false, false).is_err());
    }
}
