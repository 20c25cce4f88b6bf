//! Key normalisation between the accepted spellings and the canonical schema keys
//!
//! Rules files in the wild use camelCase (`graceSeconds`) and the bot's
//! original literal keys (`msisdn`, `ownerOnly`). Everything is folded to
//! snake_case before it reaches figment so that file values, environment
//! overrides and lookups all address the same key.

use serde_yaml::{Mapping, Value};
use types::ConfigError;

/// Original key names that do not follow from a plain camelCase conversion
const KEY_ALIASES: &[(&str, &str)] = &[
    ("msisdn", "phone_number"),
    ("owner_only", "owner_only_commands"),
];

/// Canonical snake_case form of a configuration key
pub fn canonical_key(key: &str) -> String {
    let mut snake = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            if prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
                snake.push('_');
            }
            snake.push(c.to_ascii_lowercase());
        } else if c == '-' {
            snake.push('_');
        } else {
            snake.push(c);
        }
        prev = Some(c);
    }

    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == snake)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(snake)
}

/// Rewrite every mapping key in `value` to its canonical form.
///
/// Fails when a key is not a string, or when two spellings of one key
/// (`graceSeconds` and `grace_seconds`) appear in the same mapping.
pub fn canonicalize(value: Value) -> Result<Value, ConfigError> {
    canonicalize_at(value, &mut Vec::new())
}

fn canonicalize_at(value: Value, path: &mut Vec<String>) -> Result<Value, ConfigError> {
    match value {
        Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, inner) in map {
                let key = match key {
                    Value::String(s) => canonical_key(&s),
                    other => {
                        return Err(ConfigError::ParseError(format!(
                            "Keys must be strings, found {:?} under '{}'",
                            other,
                            display_path(path)
                        )))
                    }
                };

                path.push(key.clone());
                if out.contains_key(key.as_str()) {
                    let field = path.join(".");
                    return Err(ConfigError::validation(
                        field,
                        "Key is given more than once under different spellings",
                    ));
                }
                let inner = canonicalize_at(inner, path)?;
                path.pop();

                out.insert(Value::String(key), inner);
            }
            Ok(Value::Mapping(out))
        }
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                path.push(index.to_string());
                out.push(canonicalize_at(item, path)?);
                path.pop();
            }
            Ok(Value::Sequence(out))
        }
        Value::Tagged(tagged) => canonicalize_at(tagged.value, path),
        other => Ok(other),
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
