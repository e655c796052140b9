// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests loading settings and source snapshots from disk.

use k8scfg::adapters::{SnapshotFileAdapter, StaticEnvironment};
use k8scfg::domain::{ConfigError, ConfigValue};
use k8scfg::service::SourcesSettings;
use std::io::Write;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"
- name: orders
  namespace: shop
  data:
    application.yaml: |
      server:
        port: 8080
      features: [search, cart]
- name: orders-dev
  namespace: shop
  data:
    application.yaml: |
      server:
        port: 9090
- name: pricing
  namespace: shop
  labels:
    team: payments
  data:
    currency: EUR
- name: pricing-dev
  namespace: shop
  data:
    currency: USD
"#;

const SETTINGS: &str = r#"
namespace: shop
sources:
  - name: orders
  - labels:
      team: payments
    explicit-prefix: pay
    include-profile-specific-sources: false
"#;

#[test]
fn test_load_settings_against_snapshot_file() {
    let mut snapshot_file = NamedTempFile::new().unwrap();
    write!(snapshot_file, "{}", SNAPSHOT).unwrap();

    let snapshot = SnapshotFileAdapter::from_file(snapshot_file.path()).unwrap();
    let settings = SourcesSettings::from_yaml_str(SETTINGS).unwrap();
    let env = StaticEnvironment::new().with_profile("dev");

    let loaded = settings.load(snapshot.sources(), &env).unwrap();
    assert_eq!(loaded.len(), 3);

    assert_eq!(loaded[0].name, "configmap.orders.orders-dev.shop");
    assert_eq!(
        loaded[0].properties.get("server.port"),
        Some(&ConfigValue::Integer(9090))
    );
    assert_eq!(
        loaded[0].properties.get("features[1]"),
        Some(&ConfigValue::from("cart"))
    );

    // the label entry also plans a name-based selection for the application
    assert!(loaded[1].properties.is_empty());

    assert_eq!(loaded[2].name, "configmap.pricing.shop");
    assert_eq!(
        loaded[2].properties.get("pay.currency"),
        Some(&ConfigValue::from("EUR"))
    );
}

#[test]
fn test_settings_file_with_invalid_content() {
    let mut settings_file = NamedTempFile::new().unwrap();
    write!(settings_file, "sources: [1, 2").unwrap();

    let content = std::fs::read_to_string(settings_file.path()).unwrap();
    assert!(matches!(
        SourcesSettings::from_yaml_str(&content),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_fail_fast_setting_controls_decode_failures() {
    let snapshot =
        SnapshotFileAdapter::from_yaml_str("- name: application\n  data:\n    key: \"%%\"\n")
            .unwrap();
    let env = StaticEnvironment::new();

    let strict = SourcesSettings::from_yaml_str("decode: true\n").unwrap();
    assert!(matches!(
        strict.load(snapshot.sources(), &env),
        Err(ConfigError::SourceError { .. })
    ));

    let lenient = SourcesSettings::from_yaml_str("decode: true\nfail-fast: false\n").unwrap();
    let loaded = lenient.load(snapshot.sources(), &env).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "configmap.application.default");
    assert!(loaded[0].properties.is_empty());
}
