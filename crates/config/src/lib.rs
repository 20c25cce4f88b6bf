//! Rules configuration for the clwabot WhatsApp agent
//!
//! This crate handles parsing, validation, and read-only sharing of the bot's
//! policy data (identities, command whitelist, trigger words) from YAML files
//! and environment variables.

pub mod handle;
pub mod keys;
pub mod loader;
pub mod lookup;
pub mod schema;
pub mod validation;

pub use handle::SharedConfig;
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use schema::*;
pub use validation::*;
