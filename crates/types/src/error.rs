//! Error types for the clwabot rules system

use thiserror::Error;

/// Main error type for the clwabot rules system
#[derive(Error, Debug)]
pub enum ClwabotError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown role or identity
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Not found errors
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },
}

/// Configuration specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Parse error
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Malformed or missing field at load time
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Unknown key path in the lookup accessor
    #[error("No configuration value at path: {path}")]
    LookupError { path: String },
}

impl ConfigError {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConfigError::ValidationError { .. })
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, ConfigError::LookupError { .. })
    }
}

impl From<ConfigError> for ClwabotError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::LookupError { path } => ClwabotError::NotFound { resource: path },
            other => ClwabotError::Config(other.to_string()),
        }
    }
}
