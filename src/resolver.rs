//! Contact Resolver: locate a contact's widget and open the conversation.
//!
//! An explicit state machine over three strategies, each tried only when the
//! previous one missed:
//! 1. Direct match - the name is already on screen
//! 2. Search-assisted - type the name into the app's search
//! 3. Scroll-scan - swipe the list up a bounded number of times
//!
//! A name shared by several widgets resolves to the first one the surface
//! returns. No further disambiguation is attempted.
//!
//! CHANGELOG:
//! - 10/18/2026 - Search results skip the search field itself
//! - 10/18/2026 - Activation of interactively picked candidates
//! - 10/18/2026 - Initial implementation

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ResolverConfig, Timing};
use crate::device::{DeviceSurface, Point, ScreenElement, Selector};
use crate::error::{CourierError, Result};
use crate::scraper::CandidateText;
use crate::timing::Pause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Operator picked the widget from a scrape.
    Picked,
    DirectMatch,
    SearchAssisted,
    ScrollScan,
}

impl Strategy {
    /// Fallback order. `Picked` falls back to the full chain.
    pub fn next(self) -> Option<Strategy> {
        match self {
            Strategy::Picked => Some(Strategy::DirectMatch),
            Strategy::DirectMatch => Some(Strategy::SearchAssisted),
            Strategy::SearchAssisted => Some(Strategy::ScrollScan),
            Strategy::ScrollScan => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Picked => "picked",
            Strategy::DirectMatch => "direct match",
            Strategy::SearchAssisted => "search",
            Strategy::ScrollScan => "scroll scan",
        }
    }
}

/// A located and activated contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    #[serde(skip)]
    pub element: ScreenElement,
    pub matched_text: String,
    pub strategy: Strategy,
    /// Swipes issued before the match.
    pub swipes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Resolved(Resolution),
    NotFound,
}

impl ResolutionResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }
}

/// Outcome of one strategy.
#[derive(Debug)]
enum StrategyResult {
    Resolved(Resolution),
    Miss,
}

/// Who the operator wants to reach.
#[derive(Debug, Clone)]
pub enum Target {
    Name(String),
    Candidate(CandidateText),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Name(name) => name,
            Target::Candidate(c) => &c.text,
        }
    }
}

pub struct ContactResolver<'a> {
    config: &'a ResolverConfig,
    timing: &'a Timing,
    pause: &'a dyn Pause,
}

impl<'a> ContactResolver<'a> {
    pub fn new(config: &'a ResolverConfig, timing: &'a Timing, pause: &'a dyn Pause) -> Self {
        Self {
            config,
            timing,
            pause,
        }
    }

    /// Locate `target_name` and click it.
    ///
    /// Only `DeviceUnavailable` is returned as an error. Every other failure
    /// is a miss for the strategy that hit it.
    pub fn resolve(&self, surface: &mut dyn DeviceSurface, target_name: &str) -> Result<ResolutionResult> {
        self.run_chain(surface, target_name, Strategy::DirectMatch, None)
    }

    /// Activate an operator-picked candidate, falling back to the full chain
    /// with its text if the click fails.
    pub fn resolve_candidate(
        &self,
        surface: &mut dyn DeviceSurface,
        candidate: &CandidateText,
    ) -> Result<ResolutionResult> {
        self.run_chain(surface, &candidate.text, Strategy::Picked, Some(&candidate.element))
    }

    pub fn resolve_target(&self, surface: &mut dyn DeviceSurface, target: &Target) -> Result<ResolutionResult> {
        match target {
            Target::Name(name) => self.resolve(surface, name),
            Target::Candidate(candidate) => self.resolve_candidate(surface, candidate),
        }
    }

    fn run_chain(
        &self,
        surface: &mut dyn DeviceSurface,
        target: &str,
        first: Strategy,
        picked: Option<&ScreenElement>,
    ) -> Result<ResolutionResult> {
        info!(contact = target, "resolving contact");
        let mut state = Some(first);
        while let Some(strategy) = state {
            debug!(strategy = strategy.as_str(), "trying strategy");
            match self.attempt(strategy, surface, target, picked)? {
                StrategyResult::Resolved(resolution) => {
                    info!(
                        contact = target,
                        strategy = strategy.as_str(),
                        swipes = resolution.swipes,
                        "contact resolved"
                    );
                    return Ok(ResolutionResult::Resolved(resolution));
                }
                StrategyResult::Miss => state = strategy.next(),
            }
        }
        info!(contact = target, "contact not found");
        Ok(ResolutionResult::NotFound)
    }

    /// Run one strategy. Recoverable errors become `Miss` here.
    fn attempt(
        &self,
        strategy: Strategy,
        surface: &mut dyn DeviceSurface,
        target: &str,
        picked: Option<&ScreenElement>,
    ) -> Result<StrategyResult> {
        let outcome = match strategy {
            Strategy::Picked => match picked {
                Some(element) => self.activate(surface, element, target, Strategy::Picked, 0),
                None => Ok(StrategyResult::Miss),
            },
            Strategy::DirectMatch => self.direct_match(surface, target, Strategy::DirectMatch, 0),
            Strategy::SearchAssisted => self.search_assisted(surface, target),
            Strategy::ScrollScan => self.scroll_scan(surface, target),
        };

        match outcome {
            Ok(result) => Ok(result),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(strategy = strategy.as_str(), error = %e, "strategy failed");
                Ok(StrategyResult::Miss)
            }
        }
    }

    fn activate(
        &self,
        surface: &mut dyn DeviceSurface,
        element: &ScreenElement,
        target: &str,
        strategy: Strategy,
        swipes: u32,
    ) -> Result<StrategyResult> {
        surface.click(element)?;
        Ok(StrategyResult::Resolved(Resolution {
            element: element.clone(),
            matched_text: target.to_string(),
            strategy,
            swipes,
        }))
    }

    /// First widget whose text equals `target`, clicked.
    fn direct_match(
        &self,
        surface: &mut dyn DeviceSurface,
        target: &str,
        strategy: Strategy,
        swipes: u32,
    ) -> Result<StrategyResult> {
        match surface.find_first(&Selector::text(target))? {
            Some(element) => self.activate(surface, &element, target, strategy, swipes),
            None => Ok(StrategyResult::Miss),
        }
    }

    fn search_assisted(&self, surface: &mut dyn DeviceSurface, target: &str) -> Result<StrategyResult> {
        let mut affordance = None;
        for locator in &self.config.search_locators {
            if let Some(element) = surface.find_first(locator)? {
                debug!(%locator, "search affordance found");
                affordance = Some(element);
                break;
            }
        }
        let Some(affordance) = affordance else {
            debug!("no search affordance on screen");
            return Ok(StrategyResult::Miss);
        };

        surface.click(&affordance)?;
        self.pause.pause(self.timing.search_open());

        let input = surface
            .find_first(&self.config.search_input)?
            .ok_or_else(|| CourierError::ElementNotFound(self.config.search_input.to_string()))?;
        surface.set_text(&input, target)?;
        self.pause.pause(self.timing.search_results());

        // The search field now carries the typed name too
        let result = surface.find(&Selector::text(target))?.into_iter().find(|el| {
            !el.matches(&self.config.search_input) && (input.bounds.is_empty() || el.bounds != input.bounds)
        });
        match result {
            Some(element) => self.activate(surface, &element, target, Strategy::SearchAssisted, 0),
            None => Ok(StrategyResult::Miss),
        }
    }

    fn scroll_scan(&self, surface: &mut dyn DeviceSurface, target: &str) -> Result<StrategyResult> {
        let (width, height) = surface.window_size()?;
        let x = (width / 2) as i32;
        let from = Point::new(x, (height as f64 * self.config.swipe_start).round() as i32);
        let to = Point::new(x, (height as f64 * self.config.swipe_end).round() as i32);

        let mut swipes = 0;
        loop {
            if let StrategyResult::Resolved(r) = self.direct_match(surface, target, Strategy::ScrollScan, swipes)? {
                return Ok(StrategyResult::Resolved(r));
            }
            if swipes >= self.config.max_swipes {
                return Ok(StrategyResult::Miss);
            }
            surface.swipe(from, to, self.config.swipe_duration())?;
            swipes += 1;
            debug!(swipes, max = self.config.max_swipes, "swiped");
            self.pause.pause(self.timing.swipe_settle());
        }
    }
}
