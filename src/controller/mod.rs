pub mod clock;
pub mod rhmi_config;
pub mod schedule;

pub use rhmi_config::{error_policy, reconcile, Context, ReconcileError};
