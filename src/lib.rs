// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture configuration-source resolution and merge crate.
//!
//! Given a snapshot of named key/value sources, in the manner of Kubernetes
//! ConfigMaps and Secrets, this crate decides which sources apply to the
//! running application, decodes and flattens their content, applies
//! profile-aware override rules and produces one merged view of the effective
//! properties together with the names of the sources that contributed.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`RawSource`, `MergeResult`, `Prefix`, errors)
//! - **Ports**: Trait definitions at the seams (`EnvironmentOracle`, `ConfigParser`)
//! - **Adapters**: YAML and properties parsers, environments, snapshot loading
//! - **Service**: The entry processor, source selector and merge engine
//!
//! Fetching sources from a cluster is left to the caller; the crate only
//! transforms what it is given.
//!
//! # Feature Flags
//!
//! - `env`: Enable the process environment oracle (default)
//! - `snapshot`: Enable loading source snapshots from disk (default)
//!
//! # Quick Start
//!
//! ```rust
//! use k8scfg::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let available = vec![
//!     RawSource::new("orders", "shop").with_entry("application.yaml", "color: white\nsize: 2"),
//!     RawSource::new("orders-dev", "shop").with_entry("color", "blue"),
//! ];
//! let env = StaticEnvironment::new().with_profile("dev");
//!
//! let engine = MergeEngine::builder().namespace("shop").build();
//! let result = engine.merge(&available, &env, &SelectionCriteria::names(["orders", "orders-dev"]))?;
//!
//! let properties = result.effective_properties();
//! assert_eq!(properties.get("color"), Some(&ConfigValue::from("blue")));
//! assert_eq!(properties.get("size"), Some(&ConfigValue::Integer(2)));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        resolve_prefix, ConfigError, ConfigValue, FailurePolicy, MergeResult, Prefix, RawSource,
        Result, SelectionCriteria,
    };
    pub use crate::ports::{ConfigParser, EnvironmentOracle};
    pub use crate::service::{MergeEngine, SourcesSettings};

    // Re-export adapters based on feature flags
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarEnvironment;
    #[cfg(feature = "snapshot")]
    pub use crate::adapters::SnapshotFileAdapter;
    pub use crate::adapters::{PropertiesParser, StaticEnvironment, YamlParser};
}
