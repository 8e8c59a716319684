//! Custom resource definitions owned by the operator

pub mod rhmi_config;

pub use rhmi_config::{RHMIConfig, RHMIConfigSpec, RHMIConfigStatus};

#[cfg(test)]
#[path = "rhmi_config_test.rs"]
mod rhmi_config_tests;
