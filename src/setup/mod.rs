//! Assembles the configured probes and their schedulers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result};
use uuid::Uuid;

use vigil_adapter_exec::{AppLogValidator, ExecRunner, PlatformWorkflow};
use vigil_adapter_probes::{AppPushability, HttpAvailability, RecentLogs, StreamingLogs};
use vigil_domain::{RetryPolicy, VigilConfig};
use vigil_ports::Workflow;
use vigil_runtime::PeriodicScheduler;

// Cadences of the reference deployment.
pub const HTTP_INTERVAL: Duration = Duration::from_secs(1);
pub const PUSH_INTERVAL: Duration = Duration::from_secs(60);
pub const RECENT_LOGS_INTERVAL: Duration = Duration::from_secs(10);
pub const STREAMING_LOGS_INTERVAL: Duration = Duration::from_secs(30);

/// Fresh scratch directory serving as one workflow session's CF_HOME.
pub fn session_dir() -> Result<PathBuf> {
    let dir = env::temp_dir().join(format!("vigil-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create session dir {}", dir.display()))?;
    Ok(dir)
}

/// Builds the four probes, each with its own runner, sinks and session dir,
/// wrapped in schedulers carrying the configured tolerances.
pub fn build_schedulers(
    config: &VigilConfig,
    main_workflow: &PlatformWorkflow,
    push_workflow: &PlatformWorkflow,
) -> Result<Vec<PeriodicScheduler>> {
    let tolerances = config.allowed_failures;

    let http_probe = HttpAvailability::new(main_workflow.app_url())?;

    let (push_runner, push_out, push_err) = ExecRunner::buffered();
    let push_probe = AppPushability::new(
        Arc::new(push_workflow.with_home(session_dir()?)),
        Arc::new(push_runner),
        push_out,
        push_err,
    );

    let (recent_runner, recent_out, recent_err) = ExecRunner::buffered();
    let recent_probe = RecentLogs::new(
        Arc::new(main_workflow.with_home(session_dir()?)),
        Arc::new(recent_runner),
        recent_out,
        recent_err,
        Arc::new(AppLogValidator::new()),
    );

    let (stream_runner, stream_out, stream_err) = ExecRunner::buffered();
    let stream_probe = StreamingLogs::new(
        Arc::new(main_workflow.with_home(session_dir()?)),
        Arc::new(stream_runner),
        stream_out,
        stream_err,
        Arc::new(AppLogValidator::new()),
    );

    Ok(vec![
        PeriodicScheduler::new(
            Arc::new(http_probe),
            HTTP_INTERVAL,
            tolerances.http_availability,
            RetryPolicy::none(),
        ),
        PeriodicScheduler::new(
            Arc::new(push_probe),
            PUSH_INTERVAL,
            tolerances.app_pushability,
            RetryPolicy::expired_session(),
        ),
        PeriodicScheduler::new(
            Arc::new(recent_probe),
            RECENT_LOGS_INTERVAL,
            tolerances.recent_logs,
            RetryPolicy::expired_session(),
        ),
        PeriodicScheduler::new(
            Arc::new(stream_probe),
            STREAMING_LOGS_INTERVAL,
            tolerances.streaming_logs,
            RetryPolicy::expired_session(),
        ),
    ])
}
