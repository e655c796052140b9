// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the resolution and merge engine.
//!
//! [`EntryProcessor`] flattens the data of one source, [`SourceSelector`]
//! picks the sources that contribute, and [`MergeEngine`] composes both.
//! [`SourcesSettings`] plans selections from declarative settings.

pub mod entry_processor;
pub mod merge;
pub mod naming;
pub mod selector;
pub mod settings;

// Re-export commonly used types
pub use entry_processor::{decode_data, should_process_source, EntryProcessor};
pub use merge::{MergeEngine, MergeEngineBuilder, MergeOptions};
pub use naming::{application_name, source_data_name, source_name, source_name_with_profiles};
pub use selector::SourceSelector;
pub use settings::{ResolvedSource, SourceData, SourceSettings, SourcesSettings};
