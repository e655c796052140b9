// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile-aware YAML document parser.
//!
//! A YAML entry may hold several documents separated by `---`. Each document is
//! flattened on its own; documents restricted to profiles that are not active
//! are dropped, and the remaining ones are applied in order.

use crate::domain::{ConfigError, ConfigValue, Entries, Result};
use crate::ports::{ConfigParser, EnvironmentOracle};
use serde::Deserialize;

/// Key restricting a document to a profile expression.
pub const ACTIVATE_ON_PROFILE: &str = "spring.config.activate.on-profile";

/// Legacy key restricting a document to a profile expression.
pub const LEGACY_PROFILES: &str = "spring.profiles";

/// Key under which a document that is a bare scalar is stored.
const DOCUMENT_KEY: &str = "document";

/// YAML parser implementation.
///
/// This parser converts YAML documents into flat entries, using dot notation
/// for nested mappings and `[i]` for sequence items. Scalars keep their YAML
/// type.
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::{StaticEnvironment, YamlParser};
/// use k8scfg::domain::ConfigValue;
/// use k8scfg::ports::ConfigParser;
///
/// let env = StaticEnvironment::new().with_profile("dev");
/// let yaml = "\
/// database:
///   host: localhost
///   port: 5432
/// ---
/// spring.config.activate.on-profile: dev
/// database:
///   host: dev-db
/// ";
/// let result = YamlParser::new().parse(yaml, &env).unwrap();
/// assert_eq!(result.get("database.host"), Some(&ConfigValue::from("dev-db")));
/// assert_eq!(result.get("database.port"), Some(&ConfigValue::from(5432_i64)));
/// ```
#[derive(Debug, Clone)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    /// Flattens a YAML value into entries keyed by their path.
    fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, result: &mut Entries) {
        match value {
            serde_yaml::Value::Mapping(map) if map.is_empty() => {
                if !prefix.is_empty() {
                    result.insert(prefix.to_string(), ConfigValue::from(""));
                }
            }
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    let Some(key_str) = Self::key_to_string(key) else {
                        continue;
                    };
                    let new_prefix = if prefix.is_empty() {
                        key_str
                    } else if key_str.starts_with('[') {
                        format!("{}{}", prefix, key_str)
                    } else {
                        format!("{}.{}", prefix, key_str)
                    };
                    Self::flatten_yaml(val, &new_prefix, result);
                }
            }
            serde_yaml::Value::Sequence(seq) if seq.is_empty() => {
                result.insert(Self::scalar_key(prefix), ConfigValue::from(""));
            }
            serde_yaml::Value::Sequence(seq) => {
                for (i, val) in seq.iter().enumerate() {
                    let new_prefix = format!("{}[{}]", prefix, i);
                    Self::flatten_yaml(val, &new_prefix, result);
                }
            }
            serde_yaml::Value::String(s) => {
                result.insert(Self::scalar_key(prefix), ConfigValue::from(s.as_str()));
            }
            serde_yaml::Value::Number(n) => {
                let value = if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
                    ConfigValue::Float(f)
                } else {
                    ConfigValue::String(n.to_string())
                };
                result.insert(Self::scalar_key(prefix), value);
            }
            serde_yaml::Value::Bool(b) => {
                result.insert(Self::scalar_key(prefix), ConfigValue::Bool(*b));
            }
            serde_yaml::Value::Null => {
                result.insert(Self::scalar_key(prefix), ConfigValue::from(""));
            }
            serde_yaml::Value::Tagged(tagged) => {
                Self::flatten_yaml(&tagged.value, prefix, result);
            }
        }
    }

    fn scalar_key(prefix: &str) -> String {
        if prefix.is_empty() {
            DOCUMENT_KEY.to_string()
        } else {
            prefix.to_string()
        }
    }

    fn key_to_string(key: &serde_yaml::Value) -> Option<String> {
        match key {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Returns `true` if a flattened document applies to the active profiles.
///
/// A document without `spring.config.activate.on-profile` (or the legacy
/// `spring.profiles`) always applies.
pub(crate) fn is_active_document(document: &Entries, env: &dyn EnvironmentOracle) -> Result<bool> {
    match activation_expression(document) {
        Some(expression) => env
            .accepts_profiles(&expression)
            .map_err(|e| ConfigError::ParseError {
                message: format!("Invalid profile activation in document: {}", e),
                source: Some(Box::new(e)),
            }),
        None => Ok(true),
    }
}

/// Profile expression a document is restricted to, written as a scalar or a list.
fn activation_expression(document: &Entries) -> Option<String> {
    [ACTIVATE_ON_PROFILE, LEGACY_PROFILES]
        .into_iter()
        .find_map(|key| scalar_or_list(document, key))
        .filter(|expression| !expression.trim().is_empty())
}

fn scalar_or_list(document: &Entries, key: &str) -> Option<String> {
    if let Some(value) = document.get(key) {
        return Some(value.to_string());
    }

    let mut items: Vec<(usize, String)> = document
        .iter()
        .filter_map(|(k, v)| {
            let index = k.strip_prefix(key)?.strip_prefix('[')?.strip_suffix(']')?;
            Some((index.parse().ok()?, v.to_string()))
        })
        .collect();
    if items.is_empty() {
        return None;
    }
    items.sort_by_key(|(index, _)| *index);
    Some(
        items
            .into_iter()
            .map(|(_, v)| v)
            .collect::<Vec<_>>()
            .join(","),
    )
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str, env: &dyn EnvironmentOracle) -> Result<Entries> {
        let mut result = Entries::new();

        for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
            let value = serde_yaml::Value::deserialize(document).map_err(|e| {
                ConfigError::ParseError {
                    message: format!("Failed to parse YAML: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;
            if value.is_null() {
                continue;
            }

            let mut flattened = Entries::new();
            Self::flatten_yaml(&value, "", &mut flattened);

            if is_active_document(&flattened, env)? {
                result.extend(flattened);
            } else {
                tracing::trace!("Skipping YAML document {} not active for current profiles", index);
            }
        }

        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
