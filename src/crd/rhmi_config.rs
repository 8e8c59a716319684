use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maintenance window used when `spec.maintenance.applyFrom` is blank
pub const DEFAULT_MAINTENANCE_APPLY_FROM: &str = "Thu 02:00";

/// Backup time used when `spec.backup.applyOn` is blank
pub const DEFAULT_BACKUP_APPLY_ON: &str = "03:01";

pub const DEFAULT_NOT_BEFORE_DAYS: i32 = 4;
pub const DEFAULT_WAIT_FOR_MAINTENANCE: bool = true;
pub const DEFAULT_SCHEDULE: bool = false;

/// Length of every maintenance window
pub const MAINTENANCE_WINDOW_HOURS: i64 = 6;

/// Layout of every instant written to status: `D-M-YYYY HH:MM`, UTC
///
/// Day and month are not zero-padded, the time of day is.
pub const DATE_FORMAT: &str = "%-d-%-m-%Y %H:%M";

/// Parse layout matching [`DATE_FORMAT`], accepts padded and unpadded day and month
pub const DATE_PARSE_FORMAT: &str = "%d-%m-%Y %H:%M";

/// RHMIConfig holds the customer-facing configuration of a managed installation
///
/// The operator reads the maintenance window and upgrade policy from the spec
/// and publishes the resolved maintenance window and upgrade schedule to status.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "integreatly.org",
    version = "v1alpha1",
    kind = "RHMIConfig",
    namespaced,
    status = "RHMIConfigStatus",
    printcolumn = r#"{"name":"Maintenance", "type":"string", "jsonPath":".status.maintenance.applyFrom"}"#,
    printcolumn = r#"{"name":"Upgrade", "type":"string", "jsonPath":".status.upgrade.scheduled.for"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct RHMIConfigSpec {
    #[serde(default)]
    pub upgrade: Upgrade,

    #[serde(default)]
    pub maintenance: Maintenance,

    #[serde(default)]
    pub backup: Backup,
}

impl RHMIConfigSpec {
    /// Copy of this spec with every blank or unset field filled with its default
    pub fn with_defaults(&self) -> RHMIConfigSpec {
        let mut spec = self.clone();
        if spec.maintenance.apply_from.is_empty() {
            spec.maintenance.apply_from = DEFAULT_MAINTENANCE_APPLY_FROM.to_string();
        }
        if spec.backup.apply_on.is_empty() {
            spec.backup.apply_on = DEFAULT_BACKUP_APPLY_ON.to_string();
        }
        spec.upgrade.default_if_empty();
        spec
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    /// Comma separated list of contacts notified about upgrades
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contacts: String,

    /// When true, upgrades are applied in the first maintenance window
    /// at least `notBeforeDays` after the upgrade became available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_maintenance: Option<bool>,

    /// Minimum number of days between an upgrade becoming available and being applied
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub not_before_days: Option<i32>,

    /// Whether the operator computes an upgrade schedule at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<bool>,
}

impl Upgrade {
    pub fn default_if_empty(&mut self) {
        self.not_before_days.get_or_insert(DEFAULT_NOT_BEFORE_DAYS);
        self.wait_for_maintenance
            .get_or_insert(DEFAULT_WAIT_FOR_MAINTENANCE);
        self.schedule.get_or_insert(DEFAULT_SCHEDULE);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    /// Start of the weekly maintenance window, `DDD HH:mm` in UTC (e.g. "sun 23:00")
    #[serde(default)]
    pub apply_from: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Daily backup time, `HH:mm` in UTC (e.g. "20:00")
    #[serde(default)]
    pub apply_on: String,
}

/// Observed state of an RHMIConfig
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RHMIConfigStatus {
    #[serde(default)]
    pub maintenance: MaintenanceStatus,

    #[serde(default)]
    pub upgrade: UpgradeStatus,

    /// Set by upgrade detection when a newer operator version is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_available: Option<UpgradeAvailable>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStatus {
    /// Start of the next maintenance window, formatted with [`DATE_FORMAT`]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub apply_from: String,

    /// Window length, e.g. "6hrs"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duration: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeStatus {
    /// Next upgrade schedule, absent when scheduling is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<UpgradeSchedule>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct UpgradeSchedule {
    /// When the upgrade is scheduled for, formatted with [`DATE_FORMAT`]
    #[serde(rename = "for")]
    pub scheduled_for: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeAvailable {
    /// When the new version became available (RFC3339)
    pub available_at: String,

    /// Version of the incoming operator, e.g. "integreatly-operator-v2.3.0"
    pub target_version: String,
}
