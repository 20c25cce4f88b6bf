//! Shared types for the clwabot rules system
//!
//! This crate contains the domain types shared by the configuration loader
//! and the operator CLI: roles, agent states, the error taxonomy and the
//! text helpers used for keyword matching.

pub mod error;
pub mod role;
pub mod utils;

// Re-export commonly used types
pub use error::{ClwabotError, ConfigError};
pub use role::{AgentState, Role, STATE_ALIASES};
