// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application and property source naming.

use crate::ports::EnvironmentOracle;

/// Property holding the application name.
pub const APPLICATION_NAME_PROPERTY: &str = "spring.application.name";

/// Application name used when none is configured.
pub const FALLBACK_APPLICATION_NAME: &str = "application";

/// Separator between the tokens of a property source name.
pub const PROPERTY_SOURCE_NAME_SEPARATOR: &str = ".";

/// Returns the configured name, or the application name from the environment.
///
/// A blank `config_name` falls back to [`APPLICATION_NAME_PROPERTY`] and then to
/// [`FALLBACK_APPLICATION_NAME`]. `target` only appears in the diagnostic.
///
/// # Examples
///
/// ```
/// use k8scfg::adapters::StaticEnvironment;
/// use k8scfg::service::application_name;
///
/// let env = StaticEnvironment::new().with_property("spring.application.name", "orders");
/// assert_eq!(application_name(&env, Some("billing"), "configmap"), "billing");
/// assert_eq!(application_name(&env, None, "configmap"), "orders");
/// assert_eq!(application_name(&StaticEnvironment::new(), Some(""), "secret"), "application");
/// ```
pub fn application_name(
    env: &dyn EnvironmentOracle,
    config_name: Option<&str>,
    target: &str,
) -> String {
    match config_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => {
            tracing::debug!(
                "{} name has not been set, taking it from property/env {} (default={})",
                target,
                APPLICATION_NAME_PROPERTY,
                FALLBACK_APPLICATION_NAME
            );
            env.property_or(APPLICATION_NAME_PROPERTY, FALLBACK_APPLICATION_NAME)
        }
    }
}

/// Builds `<target>.<application>.<namespace>`.
pub fn source_name(target: &str, application: &str, namespace: &str) -> String {
    [target, application, namespace].join(PROPERTY_SOURCE_NAME_SEPARATOR)
}

/// Builds `<target>.<application>.<namespace>` followed by `.<p1-p2-...>` when
/// profiles are given.
pub fn source_name_with_profiles(
    target: &str,
    application: &str,
    namespace: &str,
    profiles: &[String],
) -> String {
    let name = source_name(target, application, namespace);
    if profiles.is_empty() {
        return name;
    }
    format!(
        "{}{}{}",
        name,
        PROPERTY_SOURCE_NAME_SEPARATOR,
        profiles.join("-")
    )
}

/// Builds the aggregate name of several sources: their names are sorted and
/// joined with the separator.
///
/// # Examples
///
/// ```
/// use k8scfg::service::source_data_name;
///
/// let names = vec!["b".to_string(), "a".to_string()];
/// assert_eq!(source_data_name("configmap", &names, "ns"), "configmap.a.b.ns");
/// ```
pub fn source_data_name(target: &str, names: &[String], namespace: &str) -> String {
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    source_name(target, &sorted.join(PROPERTY_SOURCE_NAME_SEPARATOR), namespace)
}
