// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured document parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which provides an interface for
//! flattening one document stored in a source entry (YAML, properties, ...).

use crate::domain::{Entries, Result};
use crate::ports::EnvironmentOracle;

/// A trait for parsing one structured document into flat entries.
///
/// # Key Format
///
/// Parsers flatten nested structures using dot notation and index sequences
/// with brackets. A YAML structure like:
///
/// ```yaml
/// database:
///   hosts: [a, b]
///   port: 5432
/// ```
///
/// is flattened into `database.hosts[0]`, `database.hosts[1]` and
/// `database.port`.
///
/// # Profiles
///
/// The environment is passed so that parsers of multi-document formats can
/// drop documents that are not active for the current profiles.
///
/// # Examples
///
/// ```rust
/// use k8scfg::domain::{ConfigValue, Entries, Result};
/// use k8scfg::ports::{ConfigParser, EnvironmentOracle};
///
/// struct LineParser;
///
/// impl ConfigParser for LineParser {
///     fn parse(&self, content: &str, _env: &dyn EnvironmentOracle) -> Result<Entries> {
///         Ok(content
///             .lines()
///             .filter_map(|line| line.split_once(' '))
///             .map(|(k, v)| (k.to_string(), ConfigValue::from(v)))
///             .collect())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
///
/// assert!(LineParser.supports("app.lines"));
/// assert!(!LineParser.supports("app.yaml"));
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses document content into flat entries.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ConfigError::ParseError`] if the content is malformed.
    fn parse(&self, content: &str, env: &dyn EnvironmentOracle) -> Result<Entries>;

    /// Returns the file extensions (without the leading dot) handled by this parser.
    fn supported_extensions(&self) -> &[&str];

    /// Returns `true` if an entry named `resource_name` holds a document of this format.
    fn supports(&self, resource_name: &str) -> bool {
        self.supported_extensions().iter().any(|ext| {
            resource_name
                .strip_suffix(ext)
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }
}
