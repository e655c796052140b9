// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host environment trait definition.
//!
//! This module defines the `EnvironmentOracle` trait, the read-only view of the
//! host application that the merge engine consults for active profiles and
//! property lookups.

use crate::domain::{ProfileExpression, Result};

/// Read-only access to the host application's environment.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so that one environment can serve
/// merges running on several threads.
///
/// # Examples
///
/// ```rust
/// use k8scfg::ports::EnvironmentOracle;
///
/// struct DevEnvironment;
///
/// impl EnvironmentOracle for DevEnvironment {
///     fn active_profiles(&self) -> Vec<String> {
///         vec!["dev".to_string()]
///     }
///
///     fn property(&self, name: &str) -> Option<String> {
///         (name == "spring.application.name").then(|| "orders".to_string())
///     }
/// }
///
/// let env = DevEnvironment;
/// assert!(env.accepts_profiles("dev | qa").unwrap());
/// assert_eq!(env.property_or("missing", "fallback"), "fallback");
/// ```
pub trait EnvironmentOracle: Send + Sync {
    /// Returns the active profiles, in activation order.
    fn active_profiles(&self) -> Vec<String>;

    /// Looks up a property of the host application.
    fn property(&self, name: &str) -> Option<String>;

    /// Looks up a property, falling back to `default` when it is not set.
    fn property_or(&self, name: &str, default: &str) -> String {
        self.property(name).unwrap_or_else(|| default.to_string())
    }

    /// Returns `true` if the profile expression matches the active profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed.
    fn accepts_profiles(&self, expression: &str) -> Result<bool> {
        let parsed = ProfileExpression::parse(expression)?;
        Ok(parsed.matches(&self.active_profiles()))
    }
}
