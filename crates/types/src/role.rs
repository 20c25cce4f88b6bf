//! Roles and agent states recognised by the bot

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClwabotError;

/// Category of a message sender
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String")]
pub enum Role {
    /// The phone owner; full control over the agent
    Owner,
    /// The single VIP contact
    Vip,
    /// Any other number
    External,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Vip => "vip",
            Role::External => "external",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClwabotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "vip" => Ok(Role::Vip),
            // "other" is how the bot labels unknown senders internally
            "external" | "other" => Ok(Role::External),
            other => Err(ClwabotError::UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ClwabotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Initial state of the agent state machine
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum AgentState {
    /// Agent does not auto-reply
    Inactive,
    /// Agent handles inbound messages
    Active,
}

/// Accepted literals for [`AgentState`], including the Spanish forms used by
/// the bot's original rules file
pub const STATE_ALIASES: &[(&str, AgentState)] = &[
    ("INACTIVE", AgentState::Inactive),
    ("INACTIVO", AgentState::Inactive),
    ("ACTIVE", AgentState::Active),
    ("ACTIVO", AgentState::Active),
];

impl AgentState {
    /// Canonical literal
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Inactive => "INACTIVE",
            AgentState::Active => "ACTIVE",
        }
    }

    /// Resolve a literal through [`STATE_ALIASES`]; matching is exact
    pub fn from_literal(literal: &str) -> Option<Self> {
        STATE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == literal)
            .map(|(_, state)| *state)
    }
}

impl Default for AgentState {
    fn default() -> Self {
        AgentState::Inactive
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AgentState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for AgentState {
    type Err = ClwabotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_literal(s.trim()).ok_or_else(|| {
            let accepted: Vec<&str> = STATE_ALIASES.iter().map(|(alias, _)| *alias).collect();
            ClwabotError::Config(format!(
                "Unknown agent state '{}'. Accepted values: {:?}",
                s, accepted
            ))
        })
    }
}

impl TryFrom<String> for AgentState {
    type Error = ClwabotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
