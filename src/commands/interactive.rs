//! Interactive command: list the screen, ask for a contact and a message, send.
//!
//! CHANGELOG:
//! - 10/18/2026 - Pick-from-screen uses the noise filter
//! - 10/18/2026 - Initial implementation

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use super::send::{exit_status, print_report};
use super::{connect, EXIT_NOT_SENT};
use crate::config::Config;
use crate::courier::{Courier, SendReport};
use crate::device::DeviceSurface;
use crate::output::OutputControls;
use crate::prompt::{ContactSource, Prompter};
use crate::resolver::Target;
use crate::scraper::{window, ScreenScraper};
use crate::timing::{Pause, ThreadPause};

pub fn run(config: &Config, launch: bool, output: &OutputControls) -> Result<ExitCode> {
    let mut device = connect(config)?;
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match session(&mut device, config, &ThreadPause, &mut prompter, launch)? {
        Some(report) => {
            print_report(&report, output);
            Ok(ExitCode::from(exit_status(&report)))
        }
        None => Ok(ExitCode::from(EXIT_NOT_SENT)),
    }
}

/// One operator dialogue. `None` when the operator gave no usable contact.
pub fn session<R: BufRead, W: Write>(
    surface: &mut dyn DeviceSurface,
    config: &Config,
    pause: &dyn Pause,
    prompter: &mut Prompter<R, W>,
    launch: bool,
) -> Result<Option<SendReport>> {
    let mut courier = Courier::new(surface, config, pause);
    if launch {
        courier.launch()?;
    }

    let scraper = ScreenScraper::new(&config.scraper);
    let listing = match scraper.try_scrape(courier.surface()) {
        Ok(listing) => listing,
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            prompter.say(&format!("Could not read the screen: {}", e))?;
            Vec::new()
        }
    };
    prompter.show_list(
        &format!("Text on screen ({} items)", listing.len()),
        window(&listing, config.scraper.listing_limit),
    )?;

    let target = match prompter.choose_source()? {
        None => return Ok(None),
        Some(ContactSource::Typed) => {
            let name = prompter.ask("Contact name: ")?;
            if name.is_empty() {
                prompter.say("No contact name given")?;
                return Ok(None);
            }
            Target::Name(name)
        }
        Some(ContactSource::FromScreen) => {
            let plausible = scraper.plausible_contacts(&listing);
            if plausible.is_empty() {
                prompter.say("No possible contacts on screen")?;
                return Ok(None);
            }
            let rows = window(&plausible, config.scraper.candidate_limit);
            prompter.show_list("Possible contacts", rows)?;
            match prompter.pick(rows)? {
                Ok(candidate) => Target::Candidate(candidate),
                Err(e) => {
                    prompter.say(&format!("Selection aborted: {}", e))?;
                    return Ok(None);
                }
            }
        }
    };

    let mut message = prompter.ask("Message (empty for default): ")?;
    if message.is_empty() {
        message = config.app.default_message.clone();
    }

    Ok(Some(courier.send(&target, &message)?))
}
