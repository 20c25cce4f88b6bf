//! Configuration loader implementation

use crate::keys::canonicalize;
use crate::schema::Config;
use crate::validation::ConfigValidator;
use anyhow::{Context, Result};
use figment::{
    error::Kind,
    providers::{Env, Serialized},
    Figment,
};
use std::path::Path;
use tracing::{debug, info, warn};
use types::utils::mask_msisdn;
use types::ConfigError;

/// Prefix for environment overrides; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "CLWABOT_";

/// Configuration loader that handles YAML files and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Config> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: config_path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;

        let config = Self::extract(Self::figment_for(&content)?.merge(Self::env()))
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

        info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Config> {
        Self::extract(Self::figment_for(yaml_content)?)
            .context("Failed to load configuration from string")
    }

    /// Built-in rules, with environment overrides applied
    pub fn load_default() -> Result<Config> {
        Self::extract(Figment::from(Serialized::defaults(Config::default())).merge(Self::env()))
            .context("Failed to load default configuration")
    }

    /// Validate configuration, logging warnings; fails on the first error
    pub fn validate(config: &Config) -> std::result::Result<(), ConfigError> {
        let report = ConfigValidator::validate(config);
        for issue in &report.warnings {
            warn!(field = %issue.field, "{}", issue.message);
        }
        report.into_result().map(|_| ())
    }

    /// Get default configuration
    pub fn default() -> Config {
        Config::default()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let yaml_content = serde_yaml::to_string(&config)
            .context("Failed to serialize default configuration")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example configuration file")?;

        Ok(())
    }

    /// Parse a YAML document and canonicalise its keys into a figment layer
    fn figment_for(yaml_content: &str) -> Result<Figment> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml_content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let document = match document {
            // an empty file is an empty mapping
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => canonicalize(other)?,
        };

        if !document.is_mapping() {
            return Err(ConfigError::ParseError(
                "Top level of a configuration document must be a mapping".to_string(),
            )
            .into());
        }

        Ok(Figment::from(Serialized::defaults(document)))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"])
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment.extract().map_err(Self::to_validation_error)?;

        Self::validate(&config)?;

        debug!(
            owner = %mask_msisdn(&config.owner.phone_number),
            vip = %mask_msisdn(&config.vip.phone_number),
            initial_state = %config.agent.initial_state,
            "Configuration validated"
        );
        Ok(config)
    }

    /// Deserialisation failures are field-level validation failures
    fn to_validation_error(err: figment::Error) -> anyhow::Error {
        let mut path = err.path.clone();
        // unknown keys already carry their own name in the path
        if let Kind::MissingField(ref name) = err.kind {
            path.push(name.to_string());
        }

        let field = if path.is_empty() {
            "config".to_string()
        } else {
            path.join(".")
        };

        ConfigError::ValidationError {
            field,
            message: err.kind.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use tempfile::NamedTempFile;
    use types::{AgentState, Role};

    const VALID: &str = r#"
owner:
  phone_number: "+56954764325"
vip:
  phone_number: "+56975551112"
agent:
  initial_state: "INACTIVO"
commands:
  owner_only_commands: ["/agente on", "/agente off", "/agente status"]
allowed_targets: ["owner", "vip", "external"]
external:
  enabled: true
  meeting:
    trigger_words: ["reunion", "agendar", "meeting", "llamada", "cita"]
    grace_seconds: 15
urgency:
  keywords: ["urgente", "urgencia"]
"#;

    fn config_error(err: &anyhow::Error) -> &ConfigError {
        err.downcast_ref::<ConfigError>()
            .unwrap_or_else(|| panic!("expected ConfigError, got {:?}", err))
    }

    #[test]
    fn test_load_default_config() {
        Jail::expect_with(|_| {
            let config = ConfigLoader::load_default().map_err(|e| e.to_string())?;
            assert_eq!(config.owner.phone_number, "+56954764325");
            assert_eq!(config.vip.phone_number, "+56975551112");
            assert_eq!(config.agent.initial_state, AgentState::Inactive);
            assert_eq!(config.external.meeting.grace_seconds, 15);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_string() {
        let config = ConfigLoader::load_from_str(VALID).unwrap();
        assert_eq!(config.agent.initial_state, AgentState::Inactive);
        assert_eq!(config.allowed_targets, vec![Role::Owner, Role::Vip, Role::External]);
        assert_eq!(config.external.meeting.grace_seconds, 15);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_loading_is_idempotent() {
        let first = ConfigLoader::load_from_str(VALID).unwrap();
        let second = ConfigLoader::load_from_str(VALID).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_original_rules_keys_accepted() {
        let yaml_content = r#"
owner:
  msisdn: "+56954764325"
vip:
  phoneNumber: "+56975551112"
agent:
  initialState: "ACTIVO"
commands:
  ownerOnly: ["/agente on"]
allowedTargets: ["owner"]
external:
  meeting:
    triggerWords: ["cita"]
    graceSeconds: 30
"#;
        let config = ConfigLoader::load_from_str(yaml_content).unwrap();
        assert_eq!(config.agent.initial_state, AgentState::Active);
        assert_eq!(config.commands.owner_only_commands, vec!["/agente on"]);
        assert_eq!(config.allowed_targets, vec![Role::Owner]);
        assert_eq!(config.external.meeting.grace_seconds, 30);
        // omitted sections fall back to the built-in rules
        assert!(config.external.enabled);
        assert_eq!(config.urgency.keywords, vec!["urgente", "urgencia"]);
    }

    #[test]
    fn test_negative_grace_seconds_rejected() {
        let yaml_content = VALID.replace("grace_seconds: 15", "grace_seconds: -1");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        assert!(config_error(&err).is_validation());
    }

    #[test]
    fn test_unknown_initial_state_rejected() {
        let yaml_content = VALID.replace("\"INACTIVO\"", "\"PAUSED\"");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        assert!(config_error(&err).is_validation());
    }

    #[test]
    fn test_invalid_phone_rejected() {
        let yaml_content = VALID.replace("\"+56975551112\"", "\"56975551112\"");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        match config_error(&err) {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "vip.phone_number"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_targets_rejected() {
        let yaml_content = VALID.replace("[\"owner\", \"vip\", \"external\"]", "[]");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        match config_error(&err) {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "allowed_targets"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_target_rejected() {
        let yaml_content = VALID.replace("\"external\"]", "\"admin\"]");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        assert!(config_error(&err).is_validation());
    }

    #[test]
    fn test_missing_identity_rejected() {
        let err = ConfigLoader::load_from_str("agent:\n  initial_state: ACTIVE\n").unwrap_err();
        assert!(config_error(&err).is_validation());
    }

    #[test]
    fn test_malformed_yaml() {
        let err = ConfigLoader::load_from_str("owner: [unclosed").unwrap_err();
        assert!(matches!(config_error(&err), ConfigError::ParseError(_)));

        let err = ConfigLoader::load_from_str("- just\n- a list\n").unwrap_err();
        assert!(matches!(config_error(&err), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_two_spellings_of_one_key_rejected() {
        let yaml_content = VALID.replace(
            "grace_seconds: 15",
            "graceSeconds: 99\n    grace_seconds: 15",
        );
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        match config_error(&err) {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "external.meeting.grace_seconds")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_string_key_is_parse_error() {
        let yaml_content = format!("{}1: x\n", VALID);
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        assert!(matches!(config_error(&err), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_misspelled_section_rejected() {
        let yaml_content = VALID.replace("urgency:", "urgncy:");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        match config_error(&err) {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "urgncy"),
            other => panic!("unexpected error: {:?}", other),
        }

        let yaml_content = VALID.replace("enabled: true", "enabeld: true");
        let err = ConfigLoader::load_from_str(&yaml_content).unwrap_err();
        match config_error(&err) {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "external.enabeld"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load("/nonexistent/clwabot.yaml").unwrap_err();
        assert!(matches!(config_error(&err), ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("rules.yaml", VALID)?;
            jail.set_env("CLWABOT_EXTERNAL__MEETING__GRACE_SECONDS", "42");
            jail.set_env("CLWABOT_AGENT__INITIAL_STATE", "ACTIVE");
            jail.set_env("CLWABOT_CONFIG", "rules.yaml");

            let config = ConfigLoader::load("rules.yaml").map_err(|e| e.to_string())?;
            assert_eq!(config.external.meeting.grace_seconds, 42);
            assert_eq!(config.agent.initial_state, AgentState::Active);
            Ok(())
        });
    }

    #[test]
    fn test_negative_env_override_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("CLWABOT_EXTERNAL__MEETING__GRACE_SECONDS", "-1");

            let err = ConfigLoader::load_default().unwrap_err();
            assert!(config_error(&err).is_validation());
            Ok(())
        });
    }

    #[test]
    fn test_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        ConfigLoader::create_example(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("phone_number:"));
        assert!(content.contains("INACTIVE"));

        Jail::expect_with(|_| {
            let config = ConfigLoader::load(temp_file.path()).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }
}
