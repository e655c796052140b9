// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory environment adapter.
//!
//! This module provides an [`EnvironmentOracle`] whose profiles and properties
//! are supplied up front, for hosts that already resolved their environment and
//! for tests.

use crate::ports::EnvironmentOracle;
use std::collections::HashMap;

/// An environment with fixed active profiles and properties.
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::StaticEnvironment;
/// use k8scfg::ports::EnvironmentOracle;
///
/// let env = StaticEnvironment::new()
///     .with_profiles(["dev", "eu"])
///     .with_property("spring.application.name", "orders");
///
/// assert_eq!(env.active_profiles(), vec!["dev".to_string(), "eu".to_string()]);
/// assert_eq!(env.property("spring.application.name"), Some("orders".to_string()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StaticEnvironment {
    profiles: Vec<String>,
    properties: HashMap<String, String>,
}

impl StaticEnvironment {
    /// Creates an environment without active profiles or properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates one more profile. Activating a profile twice has no effect.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        let profile = profile.into();
        if !self.profiles.contains(&profile) {
            self.profiles.push(profile);
        }
        self
    }

    /// Activates several profiles in order.
    pub fn with_profiles<I, S>(self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        profiles.into_iter().fold(self, |env, p| env.with_profile(p))
    }

    /// Sets a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

impl EnvironmentOracle for StaticEnvironment {
    fn active_profiles(&self) -> Vec<String> {
        self.profiles.clone()
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_environment() {
        let env = StaticEnvironment::new();
        assert!(env.active_profiles().is_empty());
        assert_eq!(env.property("anything"), None);
    }

    #[test]
    fn test_profiles_keep_order_without_duplicates() {
        let env = StaticEnvironment::new()
            .with_profile("b")
            .with_profiles(["a", "b", "c"]);
        assert_eq!(
            env.active_profiles(),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_property_override() {
        let env = StaticEnvironment::new()
            .with_property("k", "1")
            .with_property("k", "2");
        assert_eq!(env.property("k"), Some("2".to_string()));
    }
}
