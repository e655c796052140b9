// SPDX-License-Identifier: MIT OR Apache-2.0

//! What to do when one source cannot be decoded or parsed.

use crate::domain::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Policy applied to per-source failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole merge with the failure.
    #[default]
    FailFast,
    /// Log a warning and continue without the failing entry or source.
    Lenient,
}

impl FailurePolicy {
    /// Builds the policy from a fail-fast switch.
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Lenient
        }
    }

    /// Applies the policy to a failure raised while processing `source_name`.
    ///
    /// Returns `Ok(())` when the caller should skip the failing part and carry
    /// on, or the failure wrapped in [`ConfigError::SourceError`] otherwise.
    /// Errors that are not skippable are always returned as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use k8scfg::domain::{ConfigError, FailurePolicy};
    ///
    /// let failure = || ConfigError::ParseError {
    ///     message: "bad yaml".to_string(),
    ///     source: None,
    /// };
    ///
    /// assert!(FailurePolicy::Lenient.handle("app", failure()).is_ok());
    /// assert!(FailurePolicy::FailFast.handle("app", failure()).is_err());
    /// ```
    pub fn handle(self, source_name: &str, error: ConfigError) -> Result<()> {
        if !error.is_skippable() {
            return Err(error);
        }

        match self {
            FailurePolicy::FailFast => Err(ConfigError::SourceError {
                source_name: source_name.to_string(),
                message: error.to_string(),
                source: Some(Box::new(error)),
            }),
            FailurePolicy::Lenient => {
                tracing::warn!("{}. Ignoring.", error);
                Ok(())
            }
        }
    }
}
