//! Prometheus metrics for the RHMIConfig controller

use prometheus::{
    Histogram, HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

pub type SharedMetrics = Arc<ControllerMetrics>;

/// Buckets for reconcile duration: a reconcile is a handful of API writes
const RECONCILE_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

pub struct ControllerMetrics {
    registry: Registry,
    reconciliations: IntCounterVec,
    reconcile_duration: Histogram,
    upgrade_window_open: IntGaugeVec,
}

impl ControllerMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new(
                "rhmi_config_reconciliations_total",
                "Total number of RHMIConfig reconciliations by result",
            ),
            &["result"],
        )?;
        let reconcile_duration = Histogram::with_opts(
            HistogramOpts::new(
                "rhmi_config_reconcile_duration_seconds",
                "Time spent reconciling an RHMIConfig",
            )
            .buckets(RECONCILE_BUCKETS.to_vec()),
        )?;
        let upgrade_window_open = IntGaugeVec::new(
            Opts::new(
                "rhmi_config_upgrade_window_open",
                "1 while the scheduled upgrade window of an RHMIConfig is open",
            ),
            &["namespace", "name"],
        )?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(reconcile_duration.clone()))?;
        registry.register(Box::new(upgrade_window_open.clone()))?;

        Ok(ControllerMetrics {
            registry,
            reconciliations,
            reconcile_duration,
            upgrade_window_open,
        })
    }

    pub fn record_reconciliation_success(&self, duration_secs: f64) {
        self.reconciliations.with_label_values(&["success"]).inc();
        self.reconcile_duration.observe(duration_secs);
    }

    pub fn record_reconciliation_error(&self, duration_secs: f64) {
        self.reconciliations.with_label_values(&["error"]).inc();
        self.reconcile_duration.observe(duration_secs);
    }

    pub fn set_upgrade_window_open(&self, namespace: &str, name: &str, open: bool) {
        self.upgrade_window_open
            .with_label_values(&[namespace, name])
            .set(i64::from(open));
    }

    /// Drop the window series of a deleted RHMIConfig
    pub fn forget_config(&self, namespace: &str, name: &str) {
        // Err only means the series was never set
        let _ = self
            .upgrade_window_open
            .remove_label_values(&[namespace, name]);
    }

    /// Render all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

/// Create the shared metrics registry
pub fn create_metrics() -> Result<SharedMetrics, prometheus::Error> {
    Ok(Arc::new(ControllerMetrics::new()?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_reconciliations_by_result() {
        let metrics = create_metrics().unwrap();

        metrics.record_reconciliation_success(0.01);
        metrics.record_reconciliation_success(0.02);
        metrics.record_reconciliation_error(0.5);

        let body = metrics.encode().unwrap();
        assert!(body.contains(r#"rhmi_config_reconciliations_total{result="success"} 2"#));
        assert!(body.contains(r#"rhmi_config_reconciliations_total{result="error"} 1"#));
        assert!(body.contains("rhmi_config_reconcile_duration_seconds_count 3"));
    }

    #[test]
    fn test_upgrade_window_gauge() {
        let metrics = create_metrics().unwrap();

        metrics.set_upgrade_window_open("redhat-rhmi-operator", "rhmi-config", true);
        let body = metrics.encode().unwrap();
        assert!(body.contains(
            r#"rhmi_config_upgrade_window_open{name="rhmi-config",namespace="redhat-rhmi-operator"} 1"#
        ));

        metrics.set_upgrade_window_open("redhat-rhmi-operator", "rhmi-config", false);
        let body = metrics.encode().unwrap();
        assert!(body.contains(
            r#"rhmi_config_upgrade_window_open{name="rhmi-config",namespace="redhat-rhmi-operator"} 0"#
        ));
    }

    #[test]
    fn test_forget_config_removes_window_series() {
        let metrics = create_metrics().unwrap();
        metrics.set_upgrade_window_open("redhat-rhmi-operator", "rhmi-config", true);
        metrics.set_upgrade_window_open("redhat-rhmi-operator", "other-config", false);

        metrics.forget_config("redhat-rhmi-operator", "rhmi-config");
        // Unknown series are ignored
        metrics.forget_config("redhat-rhmi-operator", "never-seen");

        let body = metrics.encode().unwrap();
        assert!(!body.contains(r#"name="rhmi-config""#));
        assert!(body.contains(r#"name="other-config""#));
    }
}
