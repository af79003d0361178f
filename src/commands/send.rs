//! Send command: one non-interactive run.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use anyhow::{ensure, Result};
use std::process::ExitCode;

use super::{connect, EXIT_NOT_SENT};
use crate::config::Config;
use crate::courier::{Courier, SendReport};
use crate::output::OutputControls;
use crate::resolver::Target;
use crate::timing::ThreadPause;

/// Resolve `contact` and send it `message`.
///
/// An empty message falls back to the configured default.
pub fn run(
    config: &Config,
    contact: &str,
    message: &str,
    launch: bool,
    output: &OutputControls,
) -> Result<ExitCode> {
    let contact = contact.trim();
    ensure!(!contact.is_empty(), "Contact name is empty");
    let message = if message.trim().is_empty() {
        config.app.default_message.as_str()
    } else {
        message
    };

    let mut device = connect(config)?;
    let pause = ThreadPause;
    let mut courier = Courier::new(&mut device, config, &pause);
    if launch {
        courier.launch()?;
    }
    let report = courier.send(&Target::Name(contact.to_string()), message)?;

    print_report(&report, output);
    Ok(ExitCode::from(exit_status(&report)))
}

/// Print a run report as JSON or a status line.
pub fn print_report(report: &SendReport, output: &OutputControls) {
    if output.json {
        output.print(report);
    } else {
        println!("{}", report.status_line());
    }
}

pub fn exit_status(report: &SendReport) -> u8 {
    if report.is_sent() {
        0
    } else {
        EXIT_NOT_SENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courier::RunStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn report(status: RunStatus) -> SendReport {
        SendReport {
            run_id: Uuid::new_v4(),
            contact: "Bob".into(),
            message: "Hi".into(),
            package: "com.tencent.mm".into(),
            status,
            resolution: None,
            delivery: None,
            suggestions: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&report(RunStatus::Sent)), 0);
        assert_eq!(exit_status(&report(RunStatus::ContactNotFound)), EXIT_NOT_SENT);
        assert_eq!(exit_status(&report(RunStatus::SendControlNotFound)), EXIT_NOT_SENT);
    }
}
