// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge engine.
//!
//! The engine ties the [`SourceSelector`] and the [`EntryProcessor`] together
//! behind one entry point, [`MergeEngine::merge`], and names the merged result.

use crate::domain::{FailurePolicy, MergeResult, RawSource, Result, SelectionCriteria};
use crate::ports::{ConfigParser, EnvironmentOracle};
use crate::service::entry_processor::EntryProcessor;
use crate::service::naming::source_data_name;
use crate::service::selector::SourceSelector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Options of one merge engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MergeOptions {
    /// Namespace of the sources, used in names and diagnostics
    pub namespace: String,
    /// Kind of source, such as `configmap` or `secret`
    pub target: String,
    /// Whether raw values are base64 encoded
    pub decode: bool,
    /// What to do with sources that cannot be decoded or parsed
    pub failure_policy: FailurePolicy,
    /// Whether default profile data of name-selected sources is kept
    pub include_default_profile_data: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            target: "configmap".to_string(),
            decode: false,
            failure_policy: FailurePolicy::FailFast,
            include_default_profile_data: true,
        }
    }
}

/// Resolves and merges raw sources.
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::StaticEnvironment;
/// use k8scfg::domain::{ConfigValue, RawSource, SelectionCriteria};
/// use k8scfg::service::MergeEngine;
///
/// # fn main() -> k8scfg::domain::Result<()> {
/// let engine = MergeEngine::builder().namespace("shop").build();
/// let available = vec![
///     RawSource::new("orders", "shop").with_entry("application.yaml", "server:\n  port: 8080"),
///     RawSource::new("orders-dev", "shop").with_entry("application.yaml", "server:\n  port: 9090"),
/// ];
/// let env = StaticEnvironment::new().with_profile("dev");
///
/// let result = engine.merge(
///     &available,
///     &env,
///     &SelectionCriteria::names(["orders", "orders-dev"]),
/// )?;
/// assert_eq!(
///     result.effective_properties().get("server.port"),
///     Some(&ConfigValue::Integer(9090))
/// );
/// assert_eq!(engine.aggregate_name(&result), "configmap.orders.orders-dev.shop");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MergeEngine {
    options: MergeOptions,
    selector: SourceSelector,
}

impl MergeEngine {
    /// Creates an engine with the given options.
    pub fn new(options: MergeOptions) -> Self {
        let processor = EntryProcessor::new(options.failure_policy);
        Self::with_processor(options, processor)
    }

    fn with_processor(options: MergeOptions, processor: EntryProcessor) -> Self {
        let selector = SourceSelector::new(processor, options.namespace.clone());
        Self { options, selector }
    }

    /// Creates a new engine builder.
    pub fn builder() -> MergeEngineBuilder {
        MergeEngineBuilder::new()
    }

    /// Returns the options of this engine.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Selects, processes and folds the sources matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns the decode or parse failure of a source under the fail-fast
    /// policy.
    pub fn merge(
        &self,
        available: &[RawSource],
        env: &dyn EnvironmentOracle,
        criteria: &SelectionCriteria,
    ) -> Result<MergeResult> {
        let result = match criteria {
            SelectionCriteria::Names(names) => self.select_by_name(available, env, names)?,
            SelectionCriteria::Labels { labels, profiles } => {
                self.select_by_labels(available, env, labels, profiles)?
            }
        };

        tracing::debug!(
            "Merged {} {} source(s) from namespace '{}': {:?}",
            result.found_names().len(),
            self.options.target,
            self.options.namespace,
            result.found_names()
        );
        Ok(result)
    }

    /// Selects sources by name with the options of this engine.
    pub fn select_by_name(
        &self,
        available: &[RawSource],
        env: &dyn EnvironmentOracle,
        requested_names: &[String],
    ) -> Result<MergeResult> {
        self.selector.select_by_name(
            available,
            env,
            requested_names,
            self.options.decode,
            self.options.include_default_profile_data,
        )
    }

    /// Selects sources by labels with the options of this engine.
    pub fn select_by_labels(
        &self,
        available: &[RawSource],
        env: &dyn EnvironmentOracle,
        required_labels: &BTreeMap<String, String>,
        profiles: &[String],
    ) -> Result<MergeResult> {
        self.selector.select_by_labels(
            available,
            env,
            required_labels,
            profiles,
            self.options.decode,
        )
    }

    /// Names a merged result: `<target>.<sorted found names>.<namespace>`.
    pub fn aggregate_name(&self, result: &MergeResult) -> String {
        source_data_name(
            &self.options.target,
            result.found_names(),
            &self.options.namespace,
        )
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

/// Builder for constructing a [`MergeEngine`].
///
/// # Examples
///
/// ```rust
/// use k8scfg::domain::FailurePolicy;
/// use k8scfg::service::MergeEngineBuilder;
///
/// let engine = MergeEngineBuilder::new()
///     .namespace("shop")
///     .target("secret")
///     .decode(true)
///     .fail_fast(false)
///     .build();
/// assert_eq!(engine.options().failure_policy, FailurePolicy::Lenient);
/// ```
#[derive(Default)]
pub struct MergeEngineBuilder {
    options: MergeOptions,
    parsers: Vec<Arc<dyn ConfigParser>>,
}

impl MergeEngineBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing options.
    pub fn options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.namespace = namespace.into();
        self
    }

    /// Sets the kind of source.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.options.target = target.into();
        self
    }

    /// Sets whether raw values are base64 encoded.
    pub fn decode(mut self, decode: bool) -> Self {
        self.options.decode = decode;
        self
    }

    /// Sets the failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.options.failure_policy = policy;
        self
    }

    /// Sets the failure policy from a fail-fast switch.
    pub fn fail_fast(self, fail_fast: bool) -> Self {
        self.failure_policy(FailurePolicy::from_fail_fast(fail_fast))
    }

    /// Sets whether default profile data of name-selected sources is kept.
    pub fn include_default_profile_data(mut self, include: bool) -> Self {
        self.options.include_default_profile_data = include;
        self
    }

    /// Registers an additional document parser.
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> MergeEngine {
        let processor = self
            .parsers
            .into_iter()
            .fold(EntryProcessor::new(self.options.failure_policy), |p, parser| {
                p.with_parser(parser)
            });
        MergeEngine::with_processor(self.options, processor)
    }
}

impl fmt::Debug for MergeEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeEngineBuilder")
            .field("options", &self.options)
            .field("parsers", &self.parsers.len())
            .finish()
    }
}
