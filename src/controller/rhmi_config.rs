pub mod reconcile;
pub mod status;
pub mod store;

pub use reconcile::*;
pub use status::*;
pub use store::*;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Tests can use unwrap/expect for brevity
#[path = "rhmi_config_test.rs"]
mod tests;
