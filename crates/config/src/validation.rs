//! Configuration validation utilities

use crate::schema::{Config, IdentityConfig};
use std::collections::HashSet;
use types::utils::{is_command_token, is_valid_msisdn, COMMAND_PREFIX};
use types::ConfigError;

/// Delays above this are clamped by the message sender
const MAX_GRACE_SECONDS: u64 = 900;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_identities(config, &mut report);
        Self::validate_commands(config, &mut report);
        Self::validate_targets(config, &mut report);
        Self::validate_external(config, &mut report);
        Self::validate_urgency(config, &mut report);
        Self::validate_logging(config, &mut report);

        report
    }

    fn validate_identities(config: &Config, report: &mut ValidationReport) {
        Self::validate_identity("owner.phone_number", &config.owner, report);
        Self::validate_identity("vip.phone_number", &config.vip, report);

        if config.owner.phone_number == config.vip.phone_number {
            report.add_error("vip.phone_number", "Owner and VIP cannot share a phone number");
        }
    }

    fn validate_identity(field: &str, identity: &IdentityConfig, report: &mut ValidationReport) {
        if identity.phone_number.is_empty() {
            report.add_error(field, "Phone number cannot be empty");
        } else if !is_valid_msisdn(&identity.phone_number) {
            report.add_error(
                field,
                &format!(
                    "Invalid phone number '{}': expected E.164 format (+ followed by 7 to 15 digits)",
                    identity.phone_number
                ),
            );
        }
    }

    fn validate_commands(config: &Config, report: &mut ValidationReport) {
        let commands = &config.commands.owner_only_commands;
        if commands.is_empty() {
            report.add_warning(
                "commands.owner_only_commands",
                "No owner-only commands configured, every command is open to all senders",
            );
            return;
        }

        let mut seen = HashSet::new();
        for command in commands {
            if !is_command_token(command) {
                report.add_error(
                    "commands.owner_only_commands",
                    &format!("Command '{}' must start with '{}'", command, COMMAND_PREFIX),
                );
            }

            if command.trim() != command {
                report.add_error(
                    "commands.owner_only_commands",
                    &format!("Command '{}' has surrounding whitespace", command),
                );
            }

            if !seen.insert(command.as_str()) {
                report.add_error(
                    "commands.owner_only_commands",
                    &format!("Duplicate command: {}", command),
                );
            }
        }
    }

    fn validate_targets(config: &Config, report: &mut ValidationReport) {
        if config.allowed_targets.is_empty() {
            report.add_error("allowed_targets", "At least one target must be allowed");
            return;
        }

        let mut seen = HashSet::new();
        for target in &config.allowed_targets {
            if !seen.insert(target) {
                report.add_warning("allowed_targets", &format!("Duplicate target: {}", target));
            }
        }
    }

    fn validate_external(config: &Config, report: &mut ValidationReport) {
        let meeting = &config.external.meeting;

        if config.external.enabled && meeting.trigger_words.is_empty() {
            report.add_warning(
                "external.meeting.trigger_words",
                "External handling is enabled but no meeting trigger words are configured",
            );
        }

        if meeting.trigger_words.iter().any(|word| word.trim().is_empty()) {
            report.add_error("external.meeting.trigger_words", "Trigger words cannot be empty");
        }

        if meeting.grace_seconds > MAX_GRACE_SECONDS {
            report.add_warning(
                "external.meeting.grace_seconds",
                &format!(
                    "Grace period is very long ({}s, max useful {}s)",
                    meeting.grace_seconds, MAX_GRACE_SECONDS
                ),
            );
        }
    }

    fn validate_urgency(config: &Config, report: &mut ValidationReport) {
        if config.urgency.keywords.is_empty() {
            report.add_warning("urgency.keywords", "No urgency keywords configured");
        }

        if config.urgency.keywords.iter().any(|word| word.trim().is_empty()) {
            report.add_error("urgency.keywords", "Urgency keywords cannot be empty");
        }
    }

    fn validate_logging(config: &Config, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            report.add_error(
                "logging.level",
                &format!("Invalid log level: {}. Valid levels: {:?}", config.logging.level, valid_levels),
            );
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            report.add_error(
                "logging.format",
                &format!("Invalid log format: {}. Valid formats: {:?}", config.logging.format, valid_formats),
            );
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }

    /// First error as a typed [`ConfigError`]
    pub fn first_error(&self) -> Option<ConfigError> {
        self.errors
            .first()
            .map(|issue| ConfigError::validation(issue.field.clone(), issue.message.clone()))
    }

    /// Ok when the report holds no errors
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, ConfigError> {
        match self.first_error() {
            Some(err) => Err(err),
            None => Ok(self.warnings),
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Role;

    #[test]
    fn test_default_config_is_valid() {
        let report = ConfigValidator::validate(&Config::default());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_invalid_phone_numbers() {
        let mut config = Config::default();
        config.owner.phone_number = "56954764325".to_string();
        config.vip.phone_number = "+56 9 7555 1112".to_string();

        let report = ConfigValidator::validate(&config);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["owner.phone_number", "vip.phone_number"]);
    }

    #[test]
    fn test_shared_identity_rejected() {
        let mut config = Config::default();
        config.vip.phone_number = config.owner.phone_number.clone();

        let err = ConfigValidator::validate(&config).first_error().unwrap();
        assert!(err.is_validation());
        assert!(err.to_string().contains("share"));
    }

    #[test]
    fn test_command_rules() {
        let mut config = Config::default();
        config.commands.owner_only_commands = vec![
            "/agente on".to_string(),
            "agente off".to_string(),
            "/agente on".to_string(),
        ];

        let report = ConfigValidator::validate(&config);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].message.contains("must start with '/'"));
        assert!(report.errors[1].message.contains("Duplicate"));

        // Case-sensitive: differing case is not a duplicate
        config.commands.owner_only_commands = vec!["/Agente on".to_string(), "/agente on".to_string()];
        assert!(ConfigValidator::validate(&config).is_valid());
    }

    #[test]
    fn test_empty_targets_rejected() {
        let mut config = Config::default();
        config.allowed_targets.clear();
        let report = ConfigValidator::validate(&config);
        assert_eq!(report.errors[0].field, "allowed_targets");

        config.allowed_targets = vec![Role::Vip, Role::Vip];
        let report = ConfigValidator::validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_trigger_words_recommended_when_enabled() {
        let mut config = Config::default();
        config.external.meeting.trigger_words.clear();

        let report = ConfigValidator::validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].field, "external.meeting.trigger_words");

        config.external.enabled = false;
        assert!(!ConfigValidator::validate(&config).has_warnings());
    }

    #[test]
    fn test_logging_values() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        config.logging.format = "xml".to_string();
        let report = ConfigValidator::validate(&config);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.summary(), "Validation: 2 errors, 0 warnings");
    }
}
