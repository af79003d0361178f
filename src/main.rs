//! contact-courier - find a contact on a phone screen and message them
//!
//! Reads the widget tree over adb, resolves the contact by direct match,
//! in-app search, or scrolling, then types and sends the message.
//!
//! CHANGELOG:
//! - 10/18/2026 - doctor and config commands
//! - 10/18/2026 - Initial CLI skeleton

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use contact_courier::commands;
use contact_courier::config::Config;
use contact_courier::error::CourierError;
use contact_courier::output::{self, OutputControls};

/// Find a contact on the device screen and send them a message.
#[derive(Parser, Debug)]
#[command(name = "contact-courier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: $COURIER_CONFIG_PATH, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device serial, when more than one is attached
    #[arg(long, global = true)]
    serial: Option<String>,

    /// Target app package id
    #[arg(long, global = true)]
    package: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Comma-separated field allowlist
    #[arg(long, global = true)]
    fields: Option<String>,

    /// Truncate text fields to this length
    #[arg(long, global = true)]
    max_text_chars: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a message to a contact
    Send {
        /// Contact name, exactly as shown on screen
        contact: String,

        /// Message to send (default: configured default message)
        message: Vec<String>,

        /// Assume the app is already open
        #[arg(long)]
        no_launch: bool,
    },

    /// Pick or type a contact, then send
    Interactive {
        /// Assume the app is already open
        #[arg(long)]
        no_launch: bool,
    },

    /// List the text on the current screen
    Screen {
        /// Only text that looks like a contact name
        #[arg(long)]
        candidates: bool,

        /// Do not cut the list to the display window
        #[arg(long)]
        all: bool,
    },

    /// Check adb, the device and the target app
    Doctor,

    /// Show the effective configuration
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output_controls = OutputControls {
        json: cli.json,
        compact: cli.compact,
        fields: cli.fields.clone(),
        max_text_chars: cli.max_text_chars,
    };

    match run(cli, &output_controls) {
        Ok(code) => code,
        Err(e) => {
            if output_controls.json {
                let code = e.downcast_ref::<CourierError>().map(CourierError::code);
                println!("{}", output::format_error(&format!("{:#}", e), code));
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, output: &OutputControls) -> Result<ExitCode> {
    let (mut config, source) = Config::discover(cli.config.as_deref())?;
    if let Some(serial) = cli.serial {
        config.device.serial = Some(serial);
    }
    if let Some(package) = cli.package {
        config.app.package = package;
    }
    config.validate()?;

    match cli.command {
        Command::Send { contact, message, no_launch } => {
            commands::send::run(&config, &contact, &message.join(" "), !no_launch, output)
        }
        Command::Interactive { no_launch } => commands::interactive::run(&config, !no_launch, output),
        Command::Screen { candidates, all } => commands::screen::run(&config, candidates, all, output),
        Command::Doctor => commands::doctor::run(&config, &source, output),
        Command::Config => commands::config::run(&config, &source, output),
    }
}
