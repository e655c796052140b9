// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable backed environment adapter.
//!
//! This module provides an [`EnvironmentOracle`] that reads the active profiles
//! and the host properties from process environment variables.

use crate::ports::EnvironmentOracle;
use std::collections::HashMap;
use std::env;
use std::sync::RwLock;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Variable holding the comma-separated active profiles by default.
pub const DEFAULT_PROFILES_VARIABLE: &str = "SPRING_PROFILES_ACTIVE";

/// Environment oracle reading process environment variables.
///
/// Property names are mapped to variable names with relaxed binding: the name
/// is upper-cased, `.` and `[` become `_`, and `-` and `]` are removed. So
/// `spring.application.name` is read from `SPRING_APPLICATION_NAME` and
/// `app.hosts[0]` from `APP_HOSTS_0`.
///
/// Variables are read once and cached; call [`EnvVarEnvironment::reload`] to
/// pick up changes.
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::EnvVarEnvironment;
/// use k8scfg::ports::EnvironmentOracle;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("SPRING_PROFILES_ACTIVE".to_string(), "dev, eu".to_string());
/// values.insert("SPRING_APPLICATION_NAME".to_string(), "orders".to_string());
///
/// let env = EnvVarEnvironment::with_values(values);
/// assert_eq!(env.active_profiles(), vec!["dev".to_string(), "eu".to_string()]);
/// assert_eq!(env.property("spring.application.name"), Some("orders".to_string()));
/// ```
#[derive(Debug)]
pub struct EnvVarEnvironment {
    /// Optional prefix that property variables must carry
    prefix: Option<String>,
    /// Variable holding the active profiles
    profiles_variable: String,
    /// Cached environment variables with interior mutability for thread-safe lazy loading
    cache: RwLock<Option<HashMap<String, String>>>,
}

impl EnvVarEnvironment {
    /// Creates an environment reading all process variables.
    pub fn new() -> Self {
        Self {
            prefix: None,
            profiles_variable: DEFAULT_PROFILES_VARIABLE.to_string(),
            cache: RwLock::new(None),
        }
    }

    /// Creates an environment whose properties are read from variables starting
    /// with `prefix`. The prefix is stripped before relaxed binding applies.
    ///
    /// The profiles variable is not affected by the prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Sets the variable holding the comma-separated active profiles.
    pub fn profiles_variable(mut self, variable: impl Into<String>) -> Self {
        self.profiles_variable = variable.into();
        self
    }

    /// Creates an environment with pre-populated variables for testing.
    ///
    /// **Note**: This method is primarily intended for testing and should not
    /// be used in production code.
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            prefix: None,
            profiles_variable: DEFAULT_PROFILES_VARIABLE.to_string(),
            cache: RwLock::new(Some(values)),
        }
    }

    /// Drops cached variables so the next lookup reads the process environment.
    pub fn reload(&self) {
        let mut guard = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Maps a property name to its environment variable name.
    fn variable_name(property: &str) -> String {
        property
            .chars()
            .filter(|c| *c != '-' && *c != ']')
            .map(|c| match c {
                '.' | '[' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }

    /// Loads environment variables into a new HashMap.
    fn load(&self) -> HashMap<String, String> {
        let mut cache = HashMap::new();

        for (key, value) in env::vars() {
            // Validate input sizes to prevent DoS
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }
            cache.insert(key, value);
        }

        tracing::debug!(
            "Loaded {} environment variables (prefix={:?}, profiles_variable={})",
            cache.len(),
            self.prefix,
            self.profiles_variable
        );

        cache
    }

    /// Looks up a variable, loading the cache if necessary.
    fn variable(&self, name: &str) -> Option<String> {
        {
            let guard = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cache) = guard.as_ref() {
                return cache.get(name).cloned();
            }
        }

        let loaded = self.load();
        let value = loaded.get(name).cloned();
        let mut guard = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(loaded);
        value
    }
}

impl Default for EnvVarEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentOracle for EnvVarEnvironment {
    fn active_profiles(&self) -> Vec<String> {
        let mut profiles: Vec<String> = Vec::new();
        if let Some(value) = self.variable(&self.profiles_variable) {
            for profile in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                if !profiles.iter().any(|p| p == profile) {
                    profiles.push(profile.to_string());
                }
            }
        }
        profiles
    }

    fn property(&self, name: &str) -> Option<String> {
        let variable = Self::variable_name(name);
        match &self.prefix {
            Some(prefix) => self.variable(&format!("{}{}", prefix, variable)),
            None => self.variable(&variable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to set and clean up environment variables
    struct EnvGuard {
        keys: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { keys: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.keys.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                env::remove_var(key);
            }
        }
    }

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_variable_name() {
        assert_eq!(
            EnvVarEnvironment::variable_name("spring.application.name"),
            "SPRING_APPLICATION_NAME"
        );
        assert_eq!(
            EnvVarEnvironment::variable_name("app.log-level"),
            "APP_LOGLEVEL"
        );
        assert_eq!(EnvVarEnvironment::variable_name("app.hosts[0]"), "APP_HOSTS_0");
    }

    #[test]
    fn test_profiles_from_values() {
        let env = EnvVarEnvironment::with_values(values(&[(
            "SPRING_PROFILES_ACTIVE",
            " dev ,prod,,dev",
        )]));
        assert_eq!(
            env.active_profiles(),
            vec!["dev".to_string(), "prod".to_string()]
        );
    }

    #[test]
    fn test_no_profiles() {
        let env = EnvVarEnvironment::with_values(HashMap::new());
        assert!(env.active_profiles().is_empty());
    }

    #[test]
    fn test_custom_profiles_variable() {
        let env = EnvVarEnvironment::with_values(values(&[("APP_PROFILES", "k8s")]))
            .profiles_variable("APP_PROFILES");
        assert_eq!(env.active_profiles(), vec!["k8s".to_string()]);
    }

    #[test]
    fn test_property_lookup() {
        let env = EnvVarEnvironment::with_values(values(&[("SERVER_PORT", "8080")]));
        assert_eq!(env.property("server.port"), Some("8080".to_string()));
        assert_eq!(env.property("server.host"), None);
    }

    #[test]
    fn test_process_environment_with_prefix() {
        let mut guard = EnvGuard::new();
        guard.set("K8SCFG_TEST_SPRING_APPLICATION_NAME", "from-env");
        guard.set("K8SCFG_TEST_PROFILES", "qa");

        let env = EnvVarEnvironment::with_prefix("K8SCFG_TEST_")
            .profiles_variable("K8SCFG_TEST_PROFILES");
        assert_eq!(
            env.property("spring.application.name"),
            Some("from-env".to_string())
        );
        assert_eq!(env.active_profiles(), vec!["qa".to_string()]);
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let mut guard = EnvGuard::new();
        guard.set("K8SCFG_RELOAD_VALUE", "one");

        let env = EnvVarEnvironment::new();
        assert_eq!(env.property("k8scfg.reload.value"), Some("one".to_string()));

        guard.set("K8SCFG_RELOAD_VALUE", "two");
        assert_eq!(env.property("k8scfg.reload.value"), Some("one".to_string()));

        env.reload();
        assert_eq!(env.property("k8scfg.reload.value"), Some("two".to_string()));
    }
}
