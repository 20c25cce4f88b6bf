//! Dotted-path access to configuration values

use crate::keys::canonical_key;
use crate::schema::Config;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use types::ConfigError;

impl Config {
    /// Value at a dotted key path such as `external.meeting.graceSeconds`.
    ///
    /// Segments may be camelCase or snake_case; numeric segments index into
    /// lists (`commands.owner_only_commands.0`).
    pub fn get(&self, path: &str) -> Result<Value, ConfigError> {
        let not_found = || ConfigError::LookupError {
            path: path.to_string(),
        };

        let root = serde_json::to_value(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        if path.trim().is_empty() {
            return Ok(root);
        }

        let mut current = &root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(&canonical_key(segment)).ok_or_else(not_found)?,
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .ok_or_else(not_found)?,
                _ => return Err(not_found()),
            };
        }

        debug!(path, "Configuration lookup");
        Ok(current.clone())
    }

    /// Typed variant of [`Config::get`]
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self.get(path)?;
        serde_json::from_value(value).map_err(|e| ConfigError::validation(path, e.to_string()))
    }
}
