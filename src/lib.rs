//! Kubernetes operator for the RHMIConfig resource
//!
//! Projects the weekly maintenance window and the scheduled upgrade time onto
//! `RHMIConfig` status and validates backup/maintenance timing.

pub mod controller;
pub mod crd;
pub mod server;
