//! Subcommand implementations

use crate::OutputFormat;
use anyhow::{Context, Result};
use config::{Config, ConfigLoader, ConfigValidator, ValidationIssue, ValidationReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::utils::mask_msisdn;
use types::Role;

/// How the rules treat a single inbound message
#[derive(Debug, Serialize)]
pub struct Classification<'a> {
    pub role: Role,
    pub target_allowed: bool,
    pub owner_only_command: Option<&'a str>,
    pub command_permitted: bool,
    pub meeting_trigger: Option<&'a str>,
    pub urgency_keyword: Option<&'a str>,
    pub grace_seconds: u64,
}

/// Rules from `path`, or the built-in rules when no file is given
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => ConfigLoader::load_default().context("Failed to load built-in rules"),
    }
}

/// Emit the validation warnings of loaded rules; call once logging is up
pub fn log_warnings(config: &Config) -> Vec<ValidationIssue> {
    let report = ConfigValidator::validate(config);
    for issue in &report.warnings {
        warn!(field = %issue.field, "{}", issue.message);
    }
    report.warnings
}

/// A missing `.env` file is normal; anything else is worth reporting
pub fn env_file_warning(result: &dotenv::Result<PathBuf>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("Could not load .env file: {}", e)),
    }
}

pub fn check(config: &Config) -> ValidationReport {
    let report = ConfigValidator::validate(config);
    info!("{}", report.summary());
    report
}

pub fn show(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(config).context("Failed to render rules as YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to render rules as JSON")
        }
    }
}

pub fn get(config: &Config, path: &str) -> Result<String> {
    let value = config.get(path)?;
    serde_json::to_string_pretty(&value).context("Failed to render value")
}

pub fn init(path: &Path) -> Result<()> {
    ConfigLoader::create_example(path)?;
    info!("Example rules written to {}", path.display());
    Ok(())
}

pub fn classify(config: &Config, msisdn: &str, text: &str) -> Result<String> {
    let classification = classification(config, msisdn, text);
    debug!(msisdn = %mask_msisdn(msisdn), role = %classification.role, "Classified message");
    serde_json::to_string_pretty(&classification).context("Failed to render classification")
}

fn classification<'a>(config: &'a Config, msisdn: &str, text: &str) -> Classification<'a> {
    let role = config.role_of(msisdn);
    Classification {
        role,
        target_allowed: config.is_target_allowed(role),
        owner_only_command: config.commands.is_owner_only_command(text),
        command_permitted: config.command_permitted(msisdn, text),
        meeting_trigger: config.meeting_trigger(text),
        urgency_keyword: config.urgency_keyword(text),
        grace_seconds: config.external.meeting.grace_seconds,
    }
}
