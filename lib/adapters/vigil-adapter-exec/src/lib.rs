//! Subprocess execution, platform command generation, and log validation.

pub mod log_validator;
pub mod runner;
pub mod workflow;

pub use log_validator::AppLogValidator;
pub use runner::ExecRunner;
pub use workflow::PlatformWorkflow;
