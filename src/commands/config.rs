//! Config command: show the effective configuration.

use anyhow::{Context, Result};
use serde_json::json;
use std::process::ExitCode;

use crate::config::{Config, ConfigSource, CONFIG_ENV};
use crate::output::OutputControls;

pub fn run(config: &Config, source: &ConfigSource, output: &OutputControls) -> Result<ExitCode> {
    if output.json {
        output.print(&json!({
            "source": source,
            "config": config,
        }));
        return Ok(ExitCode::SUCCESS);
    }

    match source {
        ConfigSource::Flag(path) => println!("Config: {} (from --config)", path.display()),
        ConfigSource::Env(path) => println!("Config: {} (from {})", path.display(), CONFIG_ENV),
        ConfigSource::UserDir(path) => println!("Config: {}", path.display()),
        ConfigSource::Defaults => println!("Config: built-in defaults"),
    }
    let body = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", body);
    Ok(ExitCode::SUCCESS)
}
