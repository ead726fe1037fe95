//! Domain models and invariants.

pub mod command;
pub mod config;
pub mod observation;
pub mod phase;
pub mod result;
pub mod retry;
pub mod sink;

pub use command::CommandSpec;
pub use config::{AllowedFailures, CommandLine, PlatformConfig, VigilConfig};
pub use observation::Observation;
pub use phase::RunPhase;
pub use result::ResultSet;
pub use retry::{RetryPolicy, TransientFailure};
pub use sink::OutputSink;
