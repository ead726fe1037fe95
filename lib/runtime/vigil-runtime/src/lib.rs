//! The measurement kernel: periodic scheduling and run orchestration.

pub mod orchestrator;
pub mod scheduler;

pub use orchestrator::Orchestrator;
pub use scheduler::{PeriodicScheduler, SchedulerVerdict};
