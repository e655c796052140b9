// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key prefixes applied to the entries a source contributes.
//!
//! A [`Prefix`] is an immutable value returned by [`resolve_prefix`]. When a
//! source is selected by labels its name is unknown at resolution time, so the
//! prefix is [`Prefix::Deferred`] until [`Prefix::resolve`] is called with the
//! discovered name.

use crate::domain::errors::{ConfigError, Result};
use std::collections::HashMap;
use std::fmt;

/// The prefix to apply to the keys of one source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    /// No prefix. Always resolvable to the empty string.
    None,
    /// A prefix whose value is known.
    Known(String),
    /// Prefixing is enabled, the value is the source name once it is discovered.
    Deferred,
}

impl Prefix {
    /// Returns the prefix value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefixState`] for a [`Prefix::Deferred`]
    /// prefix that was never resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use k8scfg::domain::Prefix;
    ///
    /// assert_eq!(Prefix::None.value().unwrap(), "");
    /// assert_eq!(Prefix::Known("db".into()).value().unwrap(), "db");
    /// assert!(Prefix::Deferred.value().is_err());
    /// ```
    pub fn value(&self) -> Result<&str> {
        match self {
            Prefix::None => Ok(""),
            Prefix::Known(value) => Ok(value),
            Prefix::Deferred => Err(ConfigError::InvalidPrefixState {
                message: "prefix is deferred, resolve it with the source name first".to_string(),
            }),
        }
    }

    /// Resolves a deferred prefix with a discovered source name.
    ///
    /// `None` and `Known` prefixes are returned unchanged.
    pub fn resolve(&self, source_name: &str) -> Prefix {
        match self {
            Prefix::Deferred => Prefix::Known(source_name.to_string()),
            other => other.clone(),
        }
    }

    /// Returns `true` while the prefix still waits for a source name.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Prefix::Deferred)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::None => write!(f, "NONE"),
            Prefix::Known(value) => write!(f, "KNOWN({})", value),
            Prefix::Deferred => write!(f, "DEFERRED"),
        }
    }
}

/// Decides which prefix applies to a source.
///
/// Rules, in priority order:
/// 1. a non-blank `explicit_prefix` always wins;
/// 2. an explicit `use_name_as_prefix` decides next;
/// 3. otherwise `default_use_name_as_prefix` decides.
///
/// Using the name as prefix yields `Known(name)` when `resolved_name` is
/// available and `Deferred` otherwise.
///
/// # Examples
///
/// ```
/// use k8scfg::domain::{resolve_prefix, Prefix};
///
/// assert_eq!(
///     resolve_prefix(Some("p"), Some(true), false, Some("n")),
///     Prefix::Known("p".to_string())
/// );
/// assert_eq!(resolve_prefix(None, Some(true), false, None), Prefix::Deferred);
/// assert_eq!(
///     resolve_prefix(None, None, true, Some("svc")),
///     Prefix::Known("svc".to_string())
/// );
/// ```
pub fn resolve_prefix(
    explicit_prefix: Option<&str>,
    use_name_as_prefix: Option<bool>,
    default_use_name_as_prefix: bool,
    resolved_name: Option<&str>,
) -> Prefix {
    if let Some(prefix) = explicit_prefix.filter(|p| !p.trim().is_empty()) {
        return Prefix::Known(prefix.to_string());
    }

    if use_name_as_prefix.unwrap_or(default_use_name_as_prefix) {
        return match resolved_name {
            Some(name) => Prefix::Known(name.to_string()),
            None => Prefix::Deferred,
        };
    }

    Prefix::None
}

/// Returns whether profile-specific sources are included for one source.
///
/// An explicit per-source setting always wins over the global default.
pub fn include_profile_specific_sources(default_include: bool, include: Option<bool>) -> bool {
    include.unwrap_or(default_include)
}

/// Returns a copy of `map` with `prefix` prepended to every key.
///
/// The prefix is prepended verbatim, callers that want a separator include it
/// in `prefix`. A blank prefix returns the map unchanged.
pub fn keys_with_prefix<V: Clone>(map: &HashMap<String, V>, prefix: &str) -> HashMap<String, V> {
    if map.is_empty() {
        return HashMap::new();
    }

    if prefix.trim().is_empty() {
        return map.clone();
    }

    map.iter()
        .map(|(key, value)| (format!("{}{}", prefix, key), value.clone()))
        .collect()
}
