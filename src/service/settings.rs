// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative source settings.
//!
//! Settings describe which sources an application reads, usually loaded from
//! YAML:
//!
//! ```yaml
//! namespace: shop
//! fail-fast: false
//! default-use-name-as-prefix: false
//! sources:
//!   - name: orders
//!     explicit-prefix: orders
//!   - labels:
//!       team: payments
//!     use-name-as-prefix: true
//! ```
//!
//! Every entry yields a name-based selection. An entry with labels yields a
//! label-based selection as well.

use crate::domain::{
    include_profile_specific_sources, resolve_prefix, ConfigError, Entries, FailurePolicy,
    Prefix, RawSource, Result, SelectionCriteria,
};
use crate::ports::EnvironmentOracle;
use crate::service::merge::{MergeEngine, MergeOptions};
use crate::service::naming::{application_name, source_data_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_namespace() -> String {
    "default".to_string()
}

fn default_target() -> String {
    "configmap".to_string()
}

fn default_true() -> bool {
    true
}

/// Global source settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourcesSettings {
    /// Default application name of the sources
    #[serde(default)]
    pub name: Option<String>,
    /// Default namespace of the sources
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Kind of source, such as `configmap` or `secret`
    #[serde(default = "default_target")]
    pub target: String,
    /// Whether raw values are base64 encoded
    #[serde(default)]
    pub decode: bool,
    /// Whether a failing source aborts the load
    #[serde(default = "default_true")]
    pub fail_fast: bool,
    /// Whether keys carry the source name as prefix unless a source says otherwise
    #[serde(default)]
    pub default_use_name_as_prefix: bool,
    /// Whether `<name>-<profile>` sources are read unless a source says otherwise
    #[serde(default = "default_true")]
    pub default_include_profile_specific_sources: bool,
    /// Whether default profile data of name-selected sources is kept
    #[serde(default = "default_true")]
    pub include_default_profile_data: bool,
    /// Individual sources; when empty, one source named after the application is read
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
}

impl Default for SourcesSettings {
    fn default() -> Self {
        Self {
            name: None,
            namespace: default_namespace(),
            target: default_target(),
            decode: false,
            fail_fast: true,
            default_use_name_as_prefix: false,
            default_include_profile_specific_sources: true,
            include_default_profile_data: true,
            sources: Vec::new(),
        }
    }
}

/// Settings of one source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceSettings {
    /// Source name; defaults to the application name
    pub name: Option<String>,
    /// Namespace; defaults to the global one
    pub namespace: Option<String>,
    /// Labels selecting additional sources
    pub labels: BTreeMap<String, String>,
    /// Prefix prepended to every key of the source
    pub explicit_prefix: Option<String>,
    /// Whether keys carry the source name as prefix
    pub use_name_as_prefix: Option<bool>,
    /// Whether `<name>-<profile>` sources are read
    pub include_profile_specific_sources: Option<bool>,
}

/// One selection planned from the settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSource {
    /// Which sources to read
    pub criteria: SelectionCriteria,
    /// Prefix of the keys
    pub prefix: Prefix,
    /// Namespace of the sources
    pub namespace: String,
}

/// Properties loaded for one planned selection.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceData {
    /// Aggregate name of the sources found
    pub name: String,
    /// Merged and prefixed properties
    pub properties: Entries,
}

impl SourcesSettings {
    /// Parses settings from YAML.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use k8scfg::service::SourcesSettings;
    ///
    /// let settings = SourcesSettings::from_yaml_str("namespace: shop\nsources:\n  - name: orders\n").unwrap();
    /// assert_eq!(settings.namespace, "shop");
    /// assert!(settings.fail_fast);
    /// assert_eq!(settings.sources[0].name.as_deref(), Some("orders"));
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse source settings: {}", e),
            source: Some(Box::new(e)),
        })
    }

    /// Returns the failure policy of the settings.
    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::from_fail_fast(self.fail_fast)
    }

    /// Plans the selections described by these settings.
    pub fn resolve(&self, env: &dyn EnvironmentOracle) -> Vec<ResolvedSource> {
        let default_source = [SourceSettings::default()];
        let sources: &[SourceSettings] = if self.sources.is_empty() {
            &default_source
        } else {
            &self.sources
        };

        let mut resolved = Vec::new();
        for source in sources {
            let namespace = source
                .namespace
                .clone()
                .unwrap_or_else(|| self.namespace.clone());
            let include_profiles = include_profile_specific_sources(
                self.default_include_profile_specific_sources,
                source.include_profile_specific_sources,
            );
            let profiles = if include_profiles {
                env.active_profiles()
            } else {
                Vec::new()
            };

            let config_name = source.name.as_deref().or(self.name.as_deref());
            let name = application_name(env, config_name, &self.target);
            let mut names = vec![name.clone()];
            names.extend(profiles.iter().map(|p| format!("{}-{}", name, p)));

            resolved.push(ResolvedSource {
                criteria: SelectionCriteria::names(names),
                prefix: resolve_prefix(
                    source.explicit_prefix.as_deref(),
                    source.use_name_as_prefix,
                    self.default_use_name_as_prefix,
                    Some(name.as_str()),
                ),
                namespace: namespace.clone(),
            });

            if !source.labels.is_empty() {
                resolved.push(ResolvedSource {
                    criteria: SelectionCriteria::labels(source.labels.clone(), profiles),
                    prefix: resolve_prefix(
                        source.explicit_prefix.as_deref(),
                        source.use_name_as_prefix,
                        self.default_use_name_as_prefix,
                        None,
                    ),
                    namespace,
                });
            }
        }
        resolved
    }

    /// Plans, merges and prefixes every selection.
    ///
    /// Only sources of the planned namespace are considered; sources without a
    /// namespace match any.
    ///
    /// # Errors
    ///
    /// Returns the first source failure under the fail-fast policy.
    pub fn load(&self, available: &[RawSource], env: &dyn EnvironmentOracle) -> Result<Vec<SourceData>> {
        let mut loaded = Vec::new();
        for plan in self.resolve(env) {
            let engine = MergeEngine::new(MergeOptions {
                namespace: plan.namespace.clone(),
                target: self.target.clone(),
                decode: self.decode,
                failure_policy: self.failure_policy(),
                include_default_profile_data: self.include_default_profile_data,
            });

            let in_namespace: Vec<RawSource> = available
                .iter()
                .filter(|s| s.namespace().is_empty() || s.namespace() == plan.namespace)
                .cloned()
                .collect();

            let result = engine.merge(&in_namespace, env, &plan.criteria)?;
            let properties = result.with_prefix(&plan.prefix)?;
            loaded.push(SourceData {
                name: source_data_name(&self.target, result.found_names(), &plan.namespace),
                properties,
            });
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticEnvironment;
    use crate::domain::ConfigValue;

    const SETTINGS: &str = r#"
namespace: shop
fail-fast: false
sources:
  - name: orders
    explicit-prefix: ord
  - name: billing
    include-profile-specific-sources: false
  - labels:
      team: payments
    use-name-as-prefix: true
"#;

    #[test]
    fn test_defaults() {
        let settings = SourcesSettings::from_yaml_str("{}").unwrap();
        assert_eq!(settings, SourcesSettings::default());
        assert_eq!(settings.failure_policy(), FailurePolicy::FailFast);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            SourcesSettings::from_yaml_str("sources: 3"),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_resolve_without_sources() {
        let env = StaticEnvironment::new()
            .with_profile("dev")
            .with_property("spring.application.name", "orders");
        let resolved = SourcesSettings::default().resolve(&env);

        assert_eq!(resolved.len(), 1);
        assert_eq!(
            resolved[0].criteria,
            SelectionCriteria::names(["orders", "orders-dev"])
        );
        assert_eq!(resolved[0].prefix, Prefix::None);
        assert_eq!(resolved[0].namespace, "default");
    }

    #[test]
    fn test_resolve_sources() {
        let settings = SourcesSettings::from_yaml_str(SETTINGS).unwrap();
        let env = StaticEnvironment::new().with_profiles(["dev", "eu"]);
        let resolved = settings.resolve(&env);

        assert_eq!(resolved.len(), 4);
        assert_eq!(
            resolved[0].criteria,
            SelectionCriteria::names(["orders", "orders-dev", "orders-eu"])
        );
        assert_eq!(resolved[0].prefix, Prefix::Known("ord".to_string()));
        assert_eq!(resolved[1].criteria, SelectionCriteria::names(["billing"]));
        assert_eq!(
            resolved[2].criteria,
            SelectionCriteria::names(["application", "application-dev", "application-eu"])
        );
        assert_eq!(resolved[2].prefix, Prefix::Known("application".to_string()));
        assert_eq!(
            resolved[3].criteria,
            SelectionCriteria::labels([("team", "payments")], ["dev", "eu"])
        );
        assert_eq!(resolved[3].prefix, Prefix::Deferred);
        assert!(resolved.iter().all(|r| r.namespace == "shop"));
    }

    #[test]
    fn test_load() {
        let settings = SourcesSettings::from_yaml_str(SETTINGS).unwrap();
        let env = StaticEnvironment::new().with_profile("dev");
        let available = vec![
            RawSource::new("orders", "shop").with_entry("color", "white"),
            RawSource::new("orders-dev", "shop").with_entry("color", "blue"),
            RawSource::new("billing", "other").with_entry("currency", "eur"),
            RawSource::new("pay", "shop")
                .with_label("team", "payments")
                .with_entry("limit", "10"),
        ];

        let loaded = settings.load(&available, &env).unwrap();
        assert_eq!(loaded.len(), 4);

        assert_eq!(loaded[0].name, "configmap.orders.orders-dev.shop");
        assert_eq!(
            loaded[0].properties.get("ord.color"),
            Some(&ConfigValue::from("blue"))
        );

        assert!(loaded[1].properties.is_empty());
        assert!(loaded[2].properties.is_empty());

        assert_eq!(loaded[3].name, "configmap.pay.shop");
        assert_eq!(
            loaded[3].properties.get("pay.limit"),
            Some(&ConfigValue::from("10"))
        );
    }
}
