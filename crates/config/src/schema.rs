//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::utils::{find_keyword, invokes_command};
use types::{AgentState, Role};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Phone owner identity
    pub owner: IdentityConfig,
    /// VIP contact identity
    pub vip: IdentityConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Command whitelist
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Roles a forwarding consumer may act upon
    #[serde(default = "default_allowed_targets", alias = "allowedTargets")]
    pub allowed_targets: Vec<Role>,
    /// External contacts configuration
    #[serde(default)]
    pub external: ExternalConfig,
    /// Urgency detection configuration
    #[serde(default)]
    pub urgency: UrgencyConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A phone-number-bound identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Phone number in E.164 format
    #[serde(alias = "phoneNumber", alias = "msisdn")]
    pub phone_number: String,
}

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// State the agent starts in
    #[serde(default, alias = "initialState")]
    pub initial_state: AgentState,
}

/// Command whitelist configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommandsConfig {
    /// Commands only the owner may issue
    #[serde(
        default = "default_owner_only_commands",
        alias = "ownerOnlyCommands",
        alias = "ownerOnly"
    )]
    pub owner_only_commands: Vec<String>,
}

/// External contacts configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExternalConfig {
    /// Whether external contacts are handled at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Meeting request detection
    #[serde(default)]
    pub meeting: MeetingConfig,
}

/// Meeting request detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MeetingConfig {
    /// Words that signal a meeting request
    #[serde(default = "default_trigger_words", alias = "triggerWords")]
    pub trigger_words: Vec<String>,
    /// Seconds to wait before acting on a trigger
    #[serde(default = "default_grace_seconds", alias = "graceSeconds")]
    pub grace_seconds: u64,
}

/// Urgency detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UrgencyConfig {
    /// Keywords that flag a message as urgent
    #[serde(default = "default_urgency_keywords")]
    pub keywords: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_owner_msisdn() -> String {
    "+56954764325".to_string()
}

fn default_vip_msisdn() -> String {
    "+56975551112".to_string()
}

fn default_true() -> bool {
    true
}

fn default_allowed_targets() -> Vec<Role> {
    vec![Role::Owner, Role::Vip, Role::External]
}

fn default_owner_only_commands() -> Vec<String> {
    ["/agente on", "/agente off", "/agente status"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_trigger_words() -> Vec<String> {
    ["reunion", "agendar", "meeting", "llamada", "cita"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_grace_seconds() -> u64 {
    15
}

fn default_urgency_keywords() -> Vec<String> {
    ["urgente", "urgencia"].into_iter().map(String::from).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    /// Role of the sender with phone number `msisdn`
    pub fn role_of(&self, msisdn: &str) -> Role {
        let msisdn = msisdn.trim();
        if msisdn == self.owner.phone_number {
            Role::Owner
        } else if msisdn == self.vip.phone_number {
            Role::Vip
        } else {
            Role::External
        }
    }

    /// Phone number bound to `role`, if any
    pub fn identity(&self, role: Role) -> Option<&str> {
        match role {
            Role::Owner => Some(self.owner.phone_number.as_str()),
            Role::Vip => Some(self.vip.phone_number.as_str()),
            Role::External => None,
        }
    }

    pub fn is_target_allowed(&self, role: Role) -> bool {
        self.allowed_targets.contains(&role)
    }

    /// False only when `text` invokes an owner-only command from a non-owner
    pub fn command_permitted(&self, msisdn: &str, text: &str) -> bool {
        match self.commands.is_owner_only_command(text) {
            Some(_) => self.role_of(msisdn) == Role::Owner,
            None => true,
        }
    }

    /// Meeting trigger word found in `text`; never matches while external handling is off
    pub fn meeting_trigger(&self, text: &str) -> Option<&str> {
        if !self.external.enabled {
            return None;
        }
        self.external.meeting.trigger(text)
    }

    pub fn urgency_keyword(&self, text: &str) -> Option<&str> {
        self.urgency.matches(text)
    }

    pub fn grace_period(&self) -> Duration {
        self.external.meeting.grace_period()
    }
}

impl CommandsConfig {
    /// Whitelisted command invoked by `text`, compared case-sensitively
    pub fn is_owner_only_command(&self, text: &str) -> Option<&str> {
        self.owner_only_commands
            .iter()
            .find(|command| invokes_command(text, command))
            .map(String::as_str)
    }
}

impl MeetingConfig {
    pub fn trigger(&self, text: &str) -> Option<&str> {
        find_keyword(text, &self.trigger_words)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_seconds)
    }
}

impl UrgencyConfig {
    pub fn matches(&self, text: &str) -> Option<&str> {
        find_keyword(text, &self.keywords)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: IdentityConfig {
                phone_number: default_owner_msisdn(),
            },
            vip: IdentityConfig {
                phone_number: default_vip_msisdn(),
            },
            agent: AgentConfig::default(),
            commands: CommandsConfig::default(),
            allowed_targets: default_allowed_targets(),
            external: ExternalConfig::default(),
            urgency: UrgencyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_state: AgentState::Inactive,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            owner_only_commands: default_owner_only_commands(),
        }
    }
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            meeting: MeetingConfig::default(),
        }
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            trigger_words: default_trigger_words(),
            grace_seconds: default_grace_seconds(),
        }
    }
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            keywords: default_urgency_keywords(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
