// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing parser and environment implementations.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer: document parsers for YAML and properties entries, environments
//! backed by fixed values or process variables, and a loader for source
//! snapshots stored on disk.

#[cfg(feature = "env")]
pub mod env_var;
pub mod properties;
#[cfg(feature = "snapshot")]
pub mod snapshot_file;
pub mod static_env;
pub mod yaml;

// Re-export adapters based on feature flags
#[cfg(feature = "env")]
pub use env_var::EnvVarEnvironment;
pub use properties::PropertiesParser;
#[cfg(feature = "snapshot")]
pub use snapshot_file::SnapshotFileAdapter;
pub use static_env::StaticEnvironment;
pub use yaml::YamlParser;
