//! Probe adapter implementations.

pub mod http;
pub mod push;
pub mod recent_logs;
pub mod streaming_logs;

pub use http::HttpAvailability;
pub use push::AppPushability;
pub use recent_logs::RecentLogs;
pub use streaming_logs::{DEFAULT_STREAM_DEADLINE, StreamingLogs};

/// Failure text handed to the scheduler: the error chain first, then
/// whatever the command wrote to stderr.
pub(crate) fn failure_diagnostics(err: anyhow::Error, captured_stderr: String) -> String {
    if captured_stderr.is_empty() {
        format!("{err:#}")
    } else {
        format!("{err:#}\n{captured_stderr}")
    }
}

#[cfg(test)]
pub(crate) mod support;
