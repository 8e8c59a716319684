#![allow(clippy::unwrap_used)] // Tests can use unwrap for brevity
#![allow(clippy::expect_used)] // Tests can use expect for better error messages

use super::rhmi_config::*;
use kube::CustomResourceExt;

#[test]
fn test_rhmi_config_deserialize_from_yaml() {
    let yaml = r#"
apiVersion: integreatly.org/v1alpha1
kind: RHMIConfig
metadata:
  name: rhmi-config
  namespace: redhat-rhmi-operator
spec:
  maintenance:
    applyFrom: "sun 23:00"
  backup:
    applyOn: "20:00"
  upgrade:
    contacts: "user1@example.com,user2@example.com"
    notBeforeDays: 7
    waitForMaintenance: false
    schedule: true
status:
  maintenance:
    applyFrom: "7-6-2020 23:00"
    duration: "6hrs"
  upgrade:
    scheduled:
      for: "14-6-2020 23:00"
  upgradeAvailable:
    availableAt: "2020-06-01T10:00:00Z"
    targetVersion: "integreatly-operator-v2.3.0"
"#;

    let config: RHMIConfig = serde_yaml::from_str(yaml).expect("Failed to deserialize RHMIConfig");

    assert_eq!(config.metadata.name.as_deref(), Some("rhmi-config"));
    assert_eq!(config.spec.maintenance.apply_from, "sun 23:00");
    assert_eq!(config.spec.backup.apply_on, "20:00");
    assert_eq!(config.spec.upgrade.not_before_days, Some(7));
    assert_eq!(config.spec.upgrade.wait_for_maintenance, Some(false));
    assert_eq!(config.spec.upgrade.schedule, Some(true));

    let status = config.status.unwrap();
    assert_eq!(status.maintenance.duration, "6hrs");
    assert_eq!(
        status.upgrade.scheduled.unwrap().scheduled_for,
        "14-6-2020 23:00"
    );
    let available = status.upgrade_available.unwrap();
    assert_eq!(available.target_version, "integreatly-operator-v2.3.0");
}

#[test]
fn test_empty_spec_deserializes_with_blank_fields() {
    let yaml = r#"
apiVersion: integreatly.org/v1alpha1
kind: RHMIConfig
metadata:
  name: rhmi-config
spec: {}
"#;

    let config: RHMIConfig = serde_yaml::from_str(yaml).unwrap();

    assert!(config.spec.maintenance.apply_from.is_empty());
    assert!(config.spec.backup.apply_on.is_empty());
    assert_eq!(config.spec.upgrade.not_before_days, None);
    assert!(config.status.is_none());
}

#[test]
fn test_with_defaults_fills_blank_values() {
    let spec = RHMIConfigSpec::default().with_defaults();

    assert_eq!(spec.maintenance.apply_from, DEFAULT_MAINTENANCE_APPLY_FROM);
    assert_eq!(spec.backup.apply_on, DEFAULT_BACKUP_APPLY_ON);
    assert_eq!(spec.upgrade.not_before_days, Some(DEFAULT_NOT_BEFORE_DAYS));
    assert_eq!(
        spec.upgrade.wait_for_maintenance,
        Some(DEFAULT_WAIT_FOR_MAINTENANCE)
    );
    assert_eq!(spec.upgrade.schedule, Some(false));
}

#[test]
fn test_with_defaults_keeps_configured_values() {
    let spec = RHMIConfigSpec {
        upgrade: Upgrade {
            not_before_days: Some(0),
            wait_for_maintenance: Some(false),
            schedule: Some(true),
            ..Default::default()
        },
        maintenance: Maintenance {
            apply_from: "mon 10:00".to_string(),
        },
        backup: Backup {
            apply_on: "22:00".to_string(),
        },
    };

    assert_eq!(spec.with_defaults(), spec);
}

#[test]
fn test_cleared_schedule_serializes_without_scheduled() {
    let status = RHMIConfigStatus::default();
    let value = serde_json::to_value(&status).unwrap();

    assert!(value["upgrade"].get("scheduled").is_none());
    assert!(value.get("upgradeAvailable").is_none());
}

#[test]
fn test_upgrade_schedule_serializes_as_for() {
    let schedule = UpgradeSchedule {
        scheduled_for: "2-1-2006 15:04".to_string(),
    };

    let value = serde_json::to_value(&schedule).unwrap();

    assert_eq!(value["for"], "2-1-2006 15:04");
}

#[test]
fn test_crd_metadata() {
    let crd = RHMIConfig::crd();

    assert_eq!(
        crd.metadata.name.as_deref(),
        Some("rhmiconfigs.integreatly.org")
    );
    assert_eq!(crd.spec.group, "integreatly.org");
    assert_eq!(crd.spec.names.kind, "RHMIConfig");
    assert_eq!(crd.spec.scope, "Namespaced");

    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1alpha1");
    assert!(version
        .subresources
        .as_ref()
        .and_then(|s| s.status.as_ref())
        .is_some());
}

#[test]
fn test_crd_schema_rejects_negative_not_before_days() {
    let crd = serde_json::to_value(RHMIConfig::crd()).unwrap();
    let not_before_days = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]
        ["spec"]["properties"]["upgrade"]["properties"]["notBeforeDays"];

    assert_eq!(not_before_days["minimum"].as_f64(), Some(0.0));
}
