// SPDX-License-Identifier: MIT OR Apache-2.0

//! Processed sources and the merged result of one selection.

use crate::domain::config_value::ConfigValue;
use crate::domain::errors::Result;
use crate::domain::prefix::Prefix;
use std::collections::HashMap;

/// Flattened entries of one source.
pub type Entries = HashMap<String, ConfigValue>;

/// The flattened, profile-filtered content of one raw source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessedSource {
    /// Name of the source the entries came from
    pub name: String,
    /// Flattened scalar entries
    pub entries: Entries,
}

impl ProcessedSource {
    /// Creates a processed source.
    pub fn new(name: impl Into<String>, entries: Entries) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// The result of selecting and processing sources.
///
/// `found_names` keeps selection order and every found name has exactly one
/// entry in `data`.
///
/// # Examples
///
/// ```
/// use k8scfg::domain::{ConfigValue, MergeResult, ProcessedSource};
/// use std::collections::HashMap;
///
/// let mut result = MergeResult::default();
/// let mut entries = HashMap::new();
/// entries.insert("a".to_string(), ConfigValue::from("1"));
/// result.push(ProcessedSource::new("app", entries));
///
/// assert_eq!(result.found_names(), &["app".to_string()]);
/// assert_eq!(
///     result.effective_properties().get("a"),
///     Some(&ConfigValue::from("1"))
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeResult {
    found_names: Vec<String>,
    data: HashMap<String, Entries>,
}

impl MergeResult {
    /// Records a processed source.
    ///
    /// A name seen before keeps its first position and its entries are replaced.
    pub fn push(&mut self, source: ProcessedSource) {
        if !self.data.contains_key(&source.name) {
            self.found_names.push(source.name.clone());
        }
        self.data.insert(source.name, source.entries);
    }

    /// Names of the sources that contributed, in selection order.
    pub fn found_names(&self) -> &[String] {
        &self.found_names
    }

    /// Processed entries keyed by source name.
    pub fn data(&self) -> &HashMap<String, Entries> {
        &self.data
    }

    /// Returns the entries of one found source.
    pub fn get(&self, name: &str) -> Option<&Entries> {
        self.data.get(name)
    }

    /// Returns `true` if no source was found.
    pub fn is_empty(&self) -> bool {
        self.found_names.is_empty()
    }

    /// Folds every source into one map; later sources win on conflicts.
    pub fn effective_properties(&self) -> Entries {
        let mut merged = Entries::new();
        for entries in self.in_order() {
            merged.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Folds every source into one map with `prefix.` prepended to its keys.
    ///
    /// A deferred prefix resolves to each source's own name.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`Prefix::value`].
    pub fn with_prefix(&self, prefix: &Prefix) -> Result<Entries> {
        let mut merged = Entries::new();
        for name in &self.found_names {
            let resolved = prefix.resolve(name);
            let value = resolved.value()?;
            if let Some(entries) = self.data.get(name) {
                for (key, entry) in entries {
                    let key = if value.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", value, key)
                    };
                    merged.insert(key, entry.clone());
                }
            }
        }
        Ok(merged)
    }

    fn in_order(&self) -> impl Iterator<Item = &Entries> {
        self.found_names
            .iter()
            .filter_map(|name| self.data.get(name))
    }
}
