// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding and flattening of the raw data of one source.
//!
//! A source either holds plain `key = value` entries, or entries that are whole
//! documents (`application.yaml`, `application-dev.properties`, ...). Documents
//! are flattened with the matching [`ConfigParser`]. When a source holds several
//! entries they are applied in this order, later ones winning:
//!
//! 1. plain entries;
//! 2. default profile documents (`<app>.<ext>` and other non-profile documents),
//!    only when default profile data is included, no profile is active or
//!    `default` is active;
//! 3. documents named `<anything>-<profile>.<ext>` for an active profile, in
//!    active profile order.
//!
//! `<app>-<profile>.<ext>` documents of profiles that are not active are dropped.

use crate::adapters::{PropertiesParser, YamlParser};
use crate::domain::{
    ConfigError, ConfigValue, Entries, FailurePolicy, RawSource, Result, DEFAULT_PROFILE,
};
use crate::ports::{ConfigParser, EnvironmentOracle};
use crate::service::naming::{APPLICATION_NAME_PROPERTY, FALLBACK_APPLICATION_NAME};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::fmt;
use std::sync::Arc;

/// Extensions of profile-specific documents, as in `orders-dev.yaml`.
const PROFILE_DOCUMENT_EXTENSIONS: [&str; 3] = ["yml", "yaml", "properties"];

/// Base64-decodes every value of a source and trims the decoded text.
///
/// # Errors
///
/// Returns [`ConfigError::DecodeError`] for a value that is not valid base64
/// or does not decode to UTF-8.
pub fn decode_data(source_name: &str, data: &[(String, String)]) -> Result<Vec<(String, String)>> {
    data.iter()
        .map(|(key, value)| {
            let decode_error = |message: String, source: Box<dyn std::error::Error + Send + Sync>| {
                ConfigError::DecodeError {
                    source_name: source_name.to_string(),
                    key: key.clone(),
                    message,
                    source: Some(source),
                }
            };
            let bytes = BASE64
                .decode(value.trim())
                .map_err(|e| decode_error(e.to_string(), Box::new(e)))?;
            let text = String::from_utf8(bytes)
                .map_err(|e| decode_error(e.to_string(), Box::new(e)))?;
            Ok((key.clone(), text.trim().to_string()))
        })
        .collect()
}

/// Returns `true` if any raw key is a document of one of the active profiles,
/// such as `account-k8s.yaml` with `k8s` active.
pub fn raw_data_contains_profile_based_source(
    active_profiles: &[String],
    raw_data: &[(String, String)],
) -> bool {
    raw_data.iter().any(|(key, _)| {
        active_profiles.iter().any(|profile| {
            PROFILE_DOCUMENT_EXTENSIONS
                .iter()
                .any(|ext| key.ends_with(&format!("-{}.{}", profile, ext)))
        })
    })
}

/// Decides whether a source selected by name contributes at all.
///
/// The source is kept when default profile data is included, when no profile
/// is active, when its name ends with `-<profile>` of an active profile, when
/// `default` is active, or when one of its keys is a document of an active
/// profile. The last rule keeps the whole source even if that document is the
/// only relevant entry; flattening drops the rest later.
pub fn should_process_source(
    include_default_profile_data: bool,
    env: &dyn EnvironmentOracle,
    source_name: &str,
    raw_data: &[(String, String)],
) -> bool {
    if include_default_profile_data {
        return true;
    }

    let active_profiles = env.active_profiles();
    active_profiles.is_empty()
        || active_profiles
            .iter()
            .any(|profile| source_name.ends_with(&format!("-{}", profile)))
        || active_profiles.iter().any(|profile| profile == DEFAULT_PROFILE)
        || raw_data_contains_profile_based_source(&active_profiles, raw_data)
}

/// Turns the raw data of one source into flat entries.
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::StaticEnvironment;
/// use k8scfg::domain::{ConfigValue, FailurePolicy};
/// use k8scfg::service::EntryProcessor;
///
/// let processor = EntryProcessor::new(FailurePolicy::FailFast);
/// let env = StaticEnvironment::new().with_profile("dev");
/// let data = vec![
///     ("application.yaml".to_string(), "color: white".to_string()),
///     ("application-dev.yaml".to_string(), "color: blue".to_string()),
///     ("owner".to_string(), "payments".to_string()),
/// ];
///
/// let entries = processor.process("orders", &data, &env, true).unwrap();
/// assert_eq!(entries.get("color"), Some(&ConfigValue::from("blue")));
/// assert_eq!(entries.get("owner"), Some(&ConfigValue::from("payments")));
/// ```
#[derive(Clone)]
pub struct EntryProcessor {
    parsers: Vec<Arc<dyn ConfigParser>>,
    policy: FailurePolicy,
}

impl EntryProcessor {
    /// Creates a processor with the YAML and properties parsers.
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            parsers: vec![Arc::new(YamlParser::new()), Arc::new(PropertiesParser::new())],
            policy,
        }
    }

    /// Registers an additional document parser.
    ///
    /// Parsers registered later take precedence for the extensions they share
    /// with earlier ones.
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.insert(0, parser);
        self
    }

    /// Returns the failure policy of this processor.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Returns the raw data of a source, decoded when requested.
    ///
    /// Returns `Ok(None)` when decoding failed and the failure policy skips the
    /// source.
    pub fn prepare(&self, source: &RawSource, decode: bool) -> Result<Option<Vec<(String, String)>>> {
        if !decode {
            return Ok(Some(source.data().to_vec()));
        }

        match decode_data(source.name(), source.data()) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                self.policy.handle(source.name(), e)?;
                Ok(None)
            }
        }
    }

    /// Flattens the (already decoded) raw data of one source.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable document under the fail-fast
    /// policy. Under the lenient policy the document is skipped with a warning.
    pub fn process(
        &self,
        source_name: &str,
        raw_data: &[(String, String)],
        env: &dyn EnvironmentOracle,
        include_default_profile_data: bool,
    ) -> Result<Entries> {
        // a single document is parsed whatever its name
        if let [(key, value)] = raw_data {
            if let Some(parser) = self.parser_for(key) {
                return self.parse_document(source_name, key, value, parser.as_ref(), env);
            }
        }

        let mut result = Entries::new();
        for (key, value) in self.sorted(raw_data, env, include_default_profile_data) {
            match self.parser_for(key) {
                Some(parser) => {
                    result.extend(self.parse_document(source_name, key, value, parser.as_ref(), env)?)
                }
                None => {
                    result.insert(key.clone(), ConfigValue::from(value.as_str()));
                }
            }
        }
        Ok(result)
    }

    fn parser_for(&self, key: &str) -> Option<&Arc<dyn ConfigParser>> {
        self.parsers.iter().find(|parser| parser.supports(key))
    }

    fn is_document(&self, key: &str) -> bool {
        self.parser_for(key).is_some()
    }

    fn parse_document(
        &self,
        source_name: &str,
        key: &str,
        value: &str,
        parser: &dyn ConfigParser,
        env: &dyn EnvironmentOracle,
    ) -> Result<Entries> {
        match parser.parse(value, env) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let error = ConfigError::ParseError {
                    message: format!("Entry '{}' of source '{}': {}", key, source_name, e),
                    source: Some(Box::new(e)),
                };
                self.policy.handle(source_name, error)?;
                Ok(Entries::new())
            }
        }
    }

    /// Orders the entries of a multi-entry source and drops the inactive ones.
    fn sorted<'a>(
        &self,
        raw_data: &'a [(String, String)],
        env: &dyn EnvironmentOracle,
        include_default_profile_data: bool,
    ) -> Vec<&'a (String, String)> {
        let application = env.property_or(APPLICATION_NAME_PROPERTY, FALLBACK_APPLICATION_NAME);
        let active_profiles = env.active_profiles();
        let include_default = include_default_profile_data
            || active_profiles.is_empty()
            || active_profiles.iter().any(|p| p == DEFAULT_PROFILE);

        let mut weighted: Vec<(usize, &(String, String))> = Vec::with_capacity(raw_data.len());
        for entry in raw_data {
            let key = entry.0.as_str();
            let weight = if !self.is_document(key) {
                Some(0)
            } else if let Some(index) = active_profiles
                .iter()
                .position(|profile| Self::is_profile_document(key, profile))
            {
                Some(2 + index)
            } else if Self::is_any_profile_document(key, &application) {
                None
            } else if include_default {
                Some(1)
            } else {
                None
            };

            match weight {
                Some(weight) => weighted.push((weight, entry)),
                None => tracing::trace!("Dropping entry '{}', not active for current profiles", key),
            }
        }

        weighted.sort_by_key(|(weight, _)| *weight);
        weighted.into_iter().map(|(_, entry)| entry).collect()
    }

    fn is_profile_document(key: &str, profile: &str) -> bool {
        PROFILE_DOCUMENT_EXTENSIONS
            .iter()
            .any(|ext| key.ends_with(&format!("-{}.{}", profile, ext)))
    }

    fn is_any_profile_document(key: &str, application: &str) -> bool {
        key.strip_prefix(application)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|rest| rest.rsplit_once('.'))
            .is_some_and(|(profile, ext)| {
                !profile.is_empty() && PROFILE_DOCUMENT_EXTENSIONS.contains(&ext)
            })
    }
}

impl Default for EntryProcessor {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}

impl fmt::Debug for EntryProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extensions: Vec<&str> = self
            .parsers
            .iter()
            .flat_map(|p| p.supported_extensions().iter().copied())
            .collect();
        f.debug_struct("EntryProcessor")
            .field("extensions", &extensions)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticEnvironment;

    fn data(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn encode(text: &str) -> String {
        BASE64.encode(text)
    }

    #[test]
    fn test_decode_data() {
        let yaml = encode("a: 1\n");
        let plain = encode(" x ");
        let raw = data(&[("app.yml", yaml.as_str()), ("plain", plain.as_str())]);
        let decoded = decode_data("secret", &raw).unwrap();
        assert_eq!(decoded, data(&[("app.yml", "a: 1"), ("plain", "x")]));
    }

    #[test]
    fn test_decode_data_invalid_base64() {
        let raw = data(&[("key", "not base64!")]);
        match decode_data("secret", &raw) {
            Err(ConfigError::DecodeError {
                source_name, key, ..
            }) => {
                assert_eq!(source_name, "secret");
                assert_eq!(key, "key");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_data_invalid_utf8() {
        let encoded = BASE64.encode([0xff, 0xfe]);
        let raw = data(&[("key", encoded.as_str())]);
        assert!(matches!(
            decode_data("secret", &raw),
            Err(ConfigError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_prepare_lenient_skips_bad_source() {
        let source = RawSource::new("broken", "ns").with_entry("key", "***");
        let lenient = EntryProcessor::new(FailurePolicy::Lenient);
        assert_eq!(lenient.prepare(&source, true).unwrap(), None);

        let strict = EntryProcessor::new(FailurePolicy::FailFast);
        assert!(matches!(
            strict.prepare(&source, true),
            Err(ConfigError::SourceError { .. })
        ));
    }

    #[test]
    fn test_prepare_without_decode() {
        let source = RawSource::new("plain", "ns").with_entry("key", "***");
        let processor = EntryProcessor::default();
        assert_eq!(
            processor.prepare(&source, false).unwrap(),
            Some(data(&[("key", "***")]))
        );
    }

    #[test]
    fn test_should_process_source_rules() {
        let none = StaticEnvironment::new();
        let dev = StaticEnvironment::new().with_profile("dev");
        let default = StaticEnvironment::new().with_profile("default");
        let plain = data(&[("a", "1")]);

        assert!(should_process_source(true, &dev, "app", &plain));
        assert!(should_process_source(false, &none, "app", &plain));
        assert!(should_process_source(false, &dev, "app-dev", &plain));
        assert!(should_process_source(false, &default, "app", &plain));
        assert!(!should_process_source(false, &dev, "app", &plain));
        assert!(!should_process_source(false, &dev, "app-prod", &plain));
    }

    #[test]
    fn test_should_process_source_profile_document_forces_inclusion() {
        let dev = StaticEnvironment::new().with_profile("dev");
        let raw = data(&[("unrelated", "1"), ("account-dev.properties", "a=1")]);
        assert!(should_process_source(false, &dev, "app", &raw));

        let other = data(&[("account-prod.yaml", "a: 1")]);
        assert!(!should_process_source(false, &dev, "app", &other));
    }

    #[test]
    fn test_plain_entries() {
        let processor = EntryProcessor::default();
        let entries = processor
            .process("app", &data(&[("a", "1"), ("b", "two")]), &StaticEnvironment::new(), true)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("a"), Some(&ConfigValue::from("1")));
        assert_eq!(entries.get("b"), Some(&ConfigValue::from("two")));
    }

    #[test]
    fn test_single_document_any_name() {
        let processor = EntryProcessor::default();
        let entries = processor
            .process(
                "app",
                &data(&[("whatever-prod.yaml", "server:\n  port: 8080")]),
                &StaticEnvironment::new().with_profile("dev"),
                false,
            )
            .unwrap();
        assert_eq!(entries.get("server.port"), Some(&ConfigValue::Integer(8080)));
    }

    #[test]
    fn test_profile_documents_override_in_profile_order() {
        let processor = EntryProcessor::default();
        let raw = data(&[
            ("application-eu.yaml", "color: green\nregion: eu"),
            ("application-dev.yaml", "color: blue"),
            ("application.yaml", "color: white\nsize: 1"),
            ("color", "plain"),
        ]);
        let env = StaticEnvironment::new().with_profiles(["dev", "eu"]);
        let entries = processor.process("app", &raw, &env, true).unwrap();

        assert_eq!(entries.get("color"), Some(&ConfigValue::from("green")));
        assert_eq!(entries.get("region"), Some(&ConfigValue::from("eu")));
        assert_eq!(entries.get("size"), Some(&ConfigValue::Integer(1)));
    }

    #[test]
    fn test_inactive_profile_documents_dropped() {
        let processor = EntryProcessor::default();
        let raw = data(&[
            ("application.yaml", "color: white"),
            ("application-prod.yaml", "color: red\nreplicas: 3"),
        ]);
        let env = StaticEnvironment::new().with_profile("dev");
        let entries = processor.process("app", &raw, &env, true).unwrap();

        assert_eq!(entries.get("color"), Some(&ConfigValue::from("white")));
        assert!(!entries.contains_key("replicas"));
    }

    #[test]
    fn test_default_documents_excluded_without_default_data() {
        let processor = EntryProcessor::default();
        let raw = data(&[
            ("application.yaml", "color: white\nsize: 1"),
            ("application-dev.yaml", "color: blue"),
        ]);
        let env = StaticEnvironment::new().with_profile("dev");
        let entries = processor.process("app", &raw, &env, false).unwrap();

        assert_eq!(entries.get("color"), Some(&ConfigValue::from("blue")));
        assert!(!entries.contains_key("size"));

        let with_default = StaticEnvironment::new().with_profiles(["default", "dev"]);
        let entries = processor.process("app", &raw, &with_default, false).unwrap();
        assert_eq!(entries.get("size"), Some(&ConfigValue::Integer(1)));
    }

    #[test]
    fn test_default_documents_kept_without_active_profiles() {
        let processor = EntryProcessor::default();
        let raw = data(&[("application.yaml", "color: white"), ("owner", "ops")]);
        let entries = processor
            .process("app", &raw, &StaticEnvironment::new(), false)
            .unwrap();

        assert_eq!(entries.get("color"), Some(&ConfigValue::from("white")));
        assert_eq!(entries.get("owner"), Some(&ConfigValue::from("ops")));
    }

    #[test]
    fn test_profile_document_of_other_name_is_applied() {
        let processor = EntryProcessor::default();
        let raw = data(&[("owner", "ops"), ("account-dev.yaml", "limit: 20")]);
        let env = StaticEnvironment::new().with_profile("dev");
        let entries = processor.process("account", &raw, &env, false).unwrap();

        assert_eq!(entries.get("limit"), Some(&ConfigValue::Integer(20)));
        assert_eq!(entries.get("owner"), Some(&ConfigValue::from("ops")));
    }

    #[test]
    fn test_application_name_from_environment() {
        let processor = EntryProcessor::default();
        let raw = data(&[
            ("orders.properties", "color=white"),
            ("orders-dev.properties", "color=blue"),
        ]);
        let env = StaticEnvironment::new()
            .with_profile("dev")
            .with_property(APPLICATION_NAME_PROPERTY, "orders");
        let entries = processor.process("app", &raw, &env, true).unwrap();
        assert_eq!(entries.get("color"), Some(&ConfigValue::from("blue")));
    }

    #[test]
    fn test_parse_failure_policies() {
        let raw = data(&[("application.yaml", "a: [1"), ("b", "2")]);
        let env = StaticEnvironment::new();

        let strict = EntryProcessor::new(FailurePolicy::FailFast);
        assert!(matches!(
            strict.process("app", &raw, &env, true),
            Err(ConfigError::SourceError { .. })
        ));

        let lenient = EntryProcessor::new(FailurePolicy::Lenient);
        let entries = lenient.process("app", &raw, &env, true).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("b"), Some(&ConfigValue::from("2")));
    }

    #[test]
    fn test_process_is_idempotent() {
        let processor = EntryProcessor::default();
        let raw = data(&[("application.yaml", "a:\n  b: 1\n  c: [x, y]"), ("d", "e")]);
        let env = StaticEnvironment::new();
        let first = processor.process("app", &raw, &env, true).unwrap();
        let second = processor.process("app", &raw, &env, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_parser_takes_precedence() {
        struct Upper;

        impl ConfigParser for Upper {
            fn parse(&self, content: &str, _env: &dyn EnvironmentOracle) -> Result<Entries> {
                let mut entries = Entries::new();
                entries.insert("content".to_string(), content.to_uppercase().into());
                Ok(entries)
            }

            fn supported_extensions(&self) -> &[&str] {
                &["yaml"]
            }
        }

        let processor = EntryProcessor::default().with_parser(Arc::new(Upper));
        let entries = processor
            .process("app", &data(&[("app.yaml", "a: 1")]), &StaticEnvironment::new(), true)
            .unwrap();
        assert_eq!(entries.get("content"), Some(&ConfigValue::from("A: 1")));
        assert!(format!("{:?}", processor).contains("yaml"));
    }
}
