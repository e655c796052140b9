// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot file adapter.
//!
//! This module provides an adapter that loads raw sources from a YAML file, for
//! hosts that export their ConfigMaps and Secrets to disk and for reproducing a
//! merge offline. The file holds a list of sources:
//!
//! ```yaml
//! - name: orders
//!   namespace: shop
//!   labels:
//!     team: payments
//!   data:
//!     application.yaml: |
//!       server:
//!         port: 8080
//! ```

use crate::domain::{ConfigError, RawSource, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed size for snapshot files (10MB)
/// This prevents denial of service attacks via extremely large files
const MAX_SNAPSHOT_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SOURCE_NAME: &str = "snapshot-file";

#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    data: serde_yaml::Mapping,
}

impl SnapshotEntry {
    fn into_raw_source(self) -> Result<RawSource> {
        let mut data = Vec::with_capacity(self.data.len());
        for (key, value) in self.data {
            let key = Self::scalar_text(&key).ok_or_else(|| ConfigError::ParseError {
                message: format!("Source '{}' has a non-scalar data key", self.name),
                source: None,
            })?;
            let value = Self::scalar_text(&value).ok_or_else(|| ConfigError::ParseError {
                message: format!(
                    "Source '{}' has a non-scalar value for key '{}'",
                    self.name, key
                ),
                source: None,
            })?;
            data.push((key, value));
        }

        Ok(RawSource::new(self.name, self.namespace)
            .with_labels(self.labels)
            .with_data(data))
    }

    fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
        match value {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Null => Some(String::new()),
            _ => None,
        }
    }
}

/// Loads a list of raw sources from a YAML snapshot file.
///
/// Data entries keep the order in which they appear in the file.
///
/// # Examples
///
/// ```rust,no_run
/// use k8scfg::adapters::SnapshotFileAdapter;
///
/// let snapshot = SnapshotFileAdapter::from_file("/var/run/config/sources.yaml").unwrap();
/// for source in snapshot.sources() {
///     println!("{} ({} entries)", source.name(), source.data().len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotFileAdapter {
    /// Path of the snapshot file, if it was read from disk
    file_path: Option<PathBuf>,
    /// Parsed sources
    sources: Vec<RawSource>,
}

impl SnapshotFileAdapter {
    /// Loads a snapshot from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SourceError`] if the file cannot be found or is too
    /// large, [`ConfigError::IoError`] if reading it fails or it is not UTF-8, and
    /// [`ConfigError::ParseError`] if its content is not a valid snapshot.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();

        // Canonicalize path to prevent directory traversal attacks
        let canonical_path = file_path
            .canonicalize()
            .map_err(|e| ConfigError::SourceError {
                source_name: SOURCE_NAME.to_string(),
                message: format!("Invalid or inaccessible path: {}", Self::display_name(&file_path)),
                source: Some(Box::new(e)),
            })?;

        let content = Self::read_bounded(&canonical_path)?;
        let sources = Self::parse_sources(&content)?;

        tracing::debug!(
            "Loaded {} sources from snapshot {}",
            sources.len(),
            Self::display_name(&canonical_path)
        );

        Ok(Self {
            file_path: Some(canonical_path),
            sources,
        })
    }

    /// Loads a snapshot from YAML text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use k8scfg::adapters::SnapshotFileAdapter;
    ///
    /// let snapshot = SnapshotFileAdapter::from_yaml_str(
    ///     "- name: app\n  data:\n    color: blue\n",
    /// )
    /// .unwrap();
    /// assert_eq!(snapshot.sources()[0].get("color"), Some("blue"));
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(Self {
            file_path: None,
            sources: Self::parse_sources(content)?,
        })
    }

    /// Returns the loaded sources.
    pub fn sources(&self) -> &[RawSource] {
        &self.sources
    }

    /// Consumes the adapter and returns the loaded sources.
    pub fn into_sources(self) -> Vec<RawSource> {
        self.sources
    }

    /// Returns the path of the snapshot file, if it was read from disk.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Re-reads the snapshot file.
    ///
    /// Snapshots built from text have nothing to reload and are left unchanged.
    pub fn reload(&mut self) -> Result<()> {
        if let Some(path) = &self.file_path {
            let content = Self::read_bounded(path)?;
            self.sources = Self::parse_sources(&content)?;
        }
        Ok(())
    }

    fn parse_sources(content: &str) -> Result<Vec<RawSource>> {
        let entries: Vec<SnapshotEntry> =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse source snapshot: {}", e),
                source: Some(Box::new(e)),
            })?;

        entries
            .into_iter()
            .map(SnapshotEntry::into_raw_source)
            .collect()
    }

    fn read_bounded(path: &Path) -> Result<String> {
        // Check file size before reading to prevent DoS via large files
        let metadata = fs::metadata(path).map_err(|e| ConfigError::SourceError {
            source_name: SOURCE_NAME.to_string(),
            message: format!("Failed to read file metadata: {}", Self::display_name(path)),
            source: Some(Box::new(e)),
        })?;

        if metadata.len() > MAX_SNAPSHOT_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: SOURCE_NAME.to_string(),
                message: format!(
                    "Snapshot file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_SNAPSHOT_FILE_SIZE
                ),
                source: None,
            });
        }

        Ok(fs::read_to_string(path)?)
    }

    fn display_name(path: &Path) -> &str {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unknown>")
    }
}
