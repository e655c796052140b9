// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source selection by name or by labels.

use crate::domain::{Entries, MergeResult, ProcessedSource, RawSource, Result};
use crate::ports::EnvironmentOracle;
use crate::service::entry_processor::{should_process_source, EntryProcessor};
use std::collections::{BTreeMap, HashMap};

/// Chooses which raw sources contribute and runs them through an [`EntryProcessor`].
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::StaticEnvironment;
/// use k8scfg::domain::{FailurePolicy, RawSource};
/// use k8scfg::service::{EntryProcessor, SourceSelector};
///
/// let selector = SourceSelector::new(EntryProcessor::new(FailurePolicy::FailFast), "shop");
/// let available = vec![
///     RawSource::new("orders", "shop").with_entry("color", "white"),
///     RawSource::new("orders-dev", "shop").with_entry("color", "blue"),
/// ];
/// let env = StaticEnvironment::new().with_profile("dev");
/// let names = vec!["orders".to_string(), "orders-dev".to_string()];
///
/// let result = selector.select_by_name(&available, &env, &names, false, true).unwrap();
/// assert_eq!(result.found_names(), &names[..]);
/// ```
#[derive(Debug, Clone)]
pub struct SourceSelector {
    processor: EntryProcessor,
    namespace: String,
}

impl SourceSelector {
    /// Creates a selector for sources of `namespace`.
    pub fn new(processor: EntryProcessor, namespace: impl Into<String>) -> Self {
        Self {
            processor,
            namespace: namespace.into(),
        }
    }

    /// Returns the namespace used in diagnostics.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the processor applied to selected sources.
    pub fn processor(&self) -> &EntryProcessor {
        &self.processor
    }

    /// Selects the sources named in `requested_names`, in that order.
    ///
    /// Missing names only produce a warning. A present source whose data is not
    /// relevant to the active profiles is left out entirely.
    ///
    /// # Errors
    ///
    /// Returns the decode or parse failure of a source under the fail-fast
    /// policy.
    pub fn select_by_name(
        &self,
        available: &[RawSource],
        env: &dyn EnvironmentOracle,
        requested_names: &[String],
        decode: bool,
        include_default_profile_data: bool,
    ) -> Result<MergeResult> {
        let by_name: HashMap<&str, &RawSource> =
            available.iter().map(|s| (s.name(), s)).collect();

        let mut result = MergeResult::default();
        for name in requested_names {
            let Some(source) = by_name.get(name.as_str()) else {
                tracing::warn!(
                    "Source '{}' was requested, but not found in namespace '{}'",
                    name,
                    self.namespace
                );
                continue;
            };
            tracing::debug!("Found source '{}' in namespace '{}'", name, self.namespace);

            let Some(raw_data) = self.processor.prepare(source, decode)? else {
                result.push(ProcessedSource::new(name.clone(), Entries::new()));
                continue;
            };

            if !should_process_source(include_default_profile_data, env, name, &raw_data) {
                tracing::debug!(
                    "Skipping source '{}', no data for active profiles {:?}",
                    name,
                    env.active_profiles()
                );
                continue;
            }

            let entries =
                self.processor
                    .process(name, &raw_data, env, include_default_profile_data)?;
            result.push(ProcessedSource::new(name.clone(), entries));
        }

        Ok(result)
    }

    /// Selects the sources carrying all `required_labels`, followed by their
    /// `<name>-<profile>` variants for every candidate profile.
    ///
    /// Every selected source is processed with default profile data included.
    ///
    /// # Errors
    ///
    /// Returns the decode or parse failure of a source under the fail-fast
    /// policy.
    pub fn select_by_labels(
        &self,
        available: &[RawSource],
        env: &dyn EnvironmentOracle,
        required_labels: &BTreeMap<String, String>,
        profiles: &[String],
        decode: bool,
    ) -> Result<MergeResult> {
        let by_labels: Vec<&RawSource> = available
            .iter()
            .filter(|s| s.has_labels(required_labels))
            .collect();

        let by_profile: Vec<&RawSource> = by_labels
            .iter()
            .flat_map(|source| {
                profiles
                    .iter()
                    .map(move |profile| format!("{}-{}", source.name(), profile))
            })
            .filter_map(|name| available.iter().find(|s| s.name() == name))
            .collect();

        let mut result = MergeResult::default();
        for source in by_labels.into_iter().chain(by_profile) {
            tracing::debug!(
                "Found source '{}' in namespace '{}' (labels {:?})",
                source.name(),
                self.namespace,
                required_labels
            );

            let entries = match self.processor.prepare(source, decode)? {
                Some(raw_data) => self.processor.process(source.name(), &raw_data, env, true)?,
                None => Entries::new(),
            };
            result.push(ProcessedSource::new(source.name(), entries));
        }

        if result.is_empty() {
            tracing::debug!(
                "No source with labels {:?} in namespace '{}'",
                required_labels,
                self.namespace
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticEnvironment;
    use crate::domain::{ConfigError, ConfigValue, FailurePolicy};

    fn selector(policy: FailurePolicy) -> SourceSelector {
        SourceSelector::new(EntryProcessor::new(policy), "shop")
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_select_by_name_missing() {
        let result = selector(FailurePolicy::FailFast)
            .select_by_name(&[], &StaticEnvironment::new(), &names(&["a", "b"]), false, true)
            .unwrap();
        assert!(result.is_empty());
        assert!(result.data().is_empty());
    }

    #[test]
    fn test_select_by_name_profile_overrides() {
        let available = vec![
            RawSource::new("app-dev", "shop").with_entry("color", "blue"),
            RawSource::new("app", "shop")
                .with_entry("color", "white")
                .with_entry("size", "1"),
        ];
        let env = StaticEnvironment::new().with_profile("dev");
        let result = selector(FailurePolicy::FailFast)
            .select_by_name(&available, &env, &names(&["app", "app-dev"]), false, true)
            .unwrap();

        assert_eq!(result.found_names(), &names(&["app", "app-dev"])[..]);
        let merged = result.effective_properties();
        assert_eq!(merged.get("color"), Some(&ConfigValue::from("blue")));
        assert_eq!(merged.get("size"), Some(&ConfigValue::from("1")));
    }

    #[test]
    fn test_select_by_name_excludes_irrelevant_source() {
        let available = vec![
            RawSource::new("app", "shop").with_entry("color", "white"),
            RawSource::new("app-dev", "shop").with_entry("color", "blue"),
        ];
        let env = StaticEnvironment::new().with_profile("dev");
        let result = selector(FailurePolicy::FailFast)
            .select_by_name(&available, &env, &names(&["app", "app-dev"]), false, false)
            .unwrap();

        assert_eq!(result.found_names(), &names(&["app-dev"])[..]);
        assert!(result.get("app").is_none());
    }

    #[test]
    fn test_select_by_name_lenient_decode_failure() {
        let available = vec![RawSource::new("secret", "shop").with_entry("key", "%%%")];
        let result = selector(FailurePolicy::Lenient)
            .select_by_name(&available, &StaticEnvironment::new(), &names(&["secret"]), true, true)
            .unwrap();
        assert_eq!(result.found_names(), &names(&["secret"])[..]);
        assert_eq!(result.get("secret").map(|e| e.len()), Some(0));

        let failed = selector(FailurePolicy::FailFast).select_by_name(
            &available,
            &StaticEnvironment::new(),
            &names(&["secret"]),
            true,
            true,
        );
        assert!(matches!(failed, Err(ConfigError::SourceError { .. })));
    }

    #[test]
    fn test_select_by_labels_order_independent_of_input() {
        let cfg = RawSource::new("cfg", "shop")
            .with_label("team", "x")
            .with_entry("color", "white");
        let cfg_dev = RawSource::new("cfg-dev", "shop").with_entry("color", "blue");
        let env = StaticEnvironment::new().with_profile("dev");

        for available in [
            vec![cfg.clone(), cfg_dev.clone()],
            vec![cfg_dev.clone(), cfg.clone()],
        ] {
            let result = selector(FailurePolicy::FailFast)
                .select_by_labels(&available, &env, &labels(&[("team", "x")]), &names(&["dev"]), false)
                .unwrap();
            assert_eq!(result.found_names(), &names(&["cfg", "cfg-dev"])[..]);
            assert_eq!(
                result.effective_properties().get("color"),
                Some(&ConfigValue::from("blue"))
            );
        }
    }

    #[test]
    fn test_select_by_labels_no_match() {
        let available = vec![RawSource::new("cfg", "shop").with_label("team", "y")];
        let result = selector(FailurePolicy::FailFast)
            .select_by_labels(
                &available,
                &StaticEnvironment::new(),
                &labels(&[("team", "x")]),
                &[],
                false,
            )
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_select_by_labels_includes_default_data() {
        let available = vec![RawSource::new("cfg", "shop")
            .with_label("team", "x")
            .with_entry("application.yaml", "color: white")
            .with_entry("application-dev.yaml", "size: 2")];
        let env = StaticEnvironment::new().with_profile("dev");
        let result = selector(FailurePolicy::FailFast)
            .select_by_labels(&available, &env, &labels(&[("team", "x")]), &[], false)
            .unwrap();

        let entries = result.get("cfg").unwrap();
        assert_eq!(entries.get("color"), Some(&ConfigValue::from("white")));
        assert_eq!(entries.get("size"), Some(&ConfigValue::Integer(2)));
    }
}
