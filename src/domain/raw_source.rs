// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw configuration sources and the criteria used to select them.
//!
//! A [`RawSource`] is a snapshot of one ConfigMap or Secret as handed over by
//! the retrieval layer. Its data keeps the insertion order of the caller,
//! because entries processed later override entries processed earlier.

use std::collections::BTreeMap;

/// An immutable snapshot of one named configuration source.
///
/// # Examples
///
/// ```
/// use k8scfg::domain::RawSource;
///
/// let source = RawSource::new("app", "default")
///     .with_label("team", "payments")
///     .with_entry("application.yaml", "server:\n  port: 8080");
///
/// assert_eq!(source.name(), "app");
/// assert_eq!(source.get("application.yaml"), Some("server:\n  port: 8080"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawSource {
    name: String,
    namespace: String,
    labels: BTreeMap<String, String>,
    data: Vec<(String, String)>,
}

impl RawSource {
    /// Creates an empty source with the given name and namespace.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            data: Vec::new(),
        }
    }

    /// Adds a label to the source.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Adds several labels to the source.
    pub fn with_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds a data entry.
    ///
    /// Re-adding an existing key replaces its value and keeps its position.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Adds several data entries in iteration order.
    pub fn with_data<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in data {
            self.insert(key.into(), value.into());
        }
        self
    }

    fn insert(&mut self, key: String, value: String) {
        match self.data.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.data.push((key, value)),
        }
    }

    /// Returns the source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace the source was read from.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the source labels.
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Returns the raw data entries in insertion order.
    pub fn data(&self) -> &[(String, String)] {
        &self.data
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if every required label is present with the same value.
    pub fn has_labels(&self, required: &BTreeMap<String, String>) -> bool {
        required
            .iter()
            .all(|(key, value)| self.labels.get(key) == Some(value))
    }
}

/// How the sources of one invocation are chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionCriteria {
    /// Select sources by exact name, processed in the listed order.
    Names(Vec<String>),
    /// Select sources carrying all the labels, plus their `<name>-<profile>` variants.
    Labels {
        /// Labels a source must carry
        labels: BTreeMap<String, String>,
        /// Candidate profile names used to find profile variants
        profiles: Vec<String>,
    },
}

impl SelectionCriteria {
    /// Builds a name-based criteria, dropping duplicate names but keeping first positions.
    ///
    /// # Examples
    ///
    /// ```
    /// use k8scfg::domain::SelectionCriteria;
    ///
    /// let criteria = SelectionCriteria::names(["app", "app-dev", "app"]);
    /// assert_eq!(
    ///     criteria,
    ///     SelectionCriteria::Names(vec!["app".to_string(), "app-dev".to_string()])
    /// );
    /// ```
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        SelectionCriteria::Names(ordered)
    }

    /// Builds a label-based criteria.
    pub fn labels<L, K, V, P, S>(labels: L, profiles: P) -> Self
    where
        L: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut candidates: Vec<String> = Vec::new();
        for profile in profiles {
            let profile = profile.into();
            if !candidates.contains(&profile) {
                candidates.push(profile);
            }
        }
        SelectionCriteria::Labels {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            profiles: candidates,
        }
    }
}
