// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and pure logic.
//!
//! This module contains the raw source and result types, scalar values,
//! prefixes, profile expressions and errors. It is independent of any parser
//! or environment implementation.

pub mod config_value;
pub mod errors;
pub mod failure;
pub mod merge_result;
pub mod prefix;
pub mod profiles;
pub mod raw_source;

// Re-export commonly used types
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use failure::FailurePolicy;
pub use merge_result::{Entries, MergeResult, ProcessedSource};
pub use prefix::{include_profile_specific_sources, keys_with_prefix, resolve_prefix, Prefix};
pub use profiles::{ProfileExpression, DEFAULT_PROFILE};
pub use raw_source::{RawSource, SelectionCriteria};
