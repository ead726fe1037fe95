//! Continuous platform-uptime verification: exercises a live deployment for
//! one bounded window and reports a single pass/fail exit status.

pub mod setup;

/// Printed by `vigil -v`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
