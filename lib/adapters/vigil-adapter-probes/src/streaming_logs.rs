use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use vigil_domain::{Observation, OutputSink};
use vigil_ports::{CommandRunner, LogValidator, Probe, Workflow};

use crate::failure_diagnostics;

pub const DEFAULT_STREAM_DEADLINE: Duration = Duration::from_secs(15);

/// Streams the application's logs under a fresh cancellation token each
/// invocation. The stream is cut at the deadline and whatever was captured
/// by then is validated as a partial result; hitting the deadline is the
/// expected way for an invocation to end.
pub struct StreamingLogs {
    workflow: Arc<dyn Workflow>,
    runner: Arc<dyn CommandRunner>,
    stdout: OutputSink,
    stderr: OutputSink,
    validator: Arc<dyn LogValidator>,
    deadline: Duration,
}

impl StreamingLogs {
    pub fn new(
        workflow: Arc<dyn Workflow>,
        runner: Arc<dyn CommandRunner>,
        stdout: OutputSink,
        stderr: OutputSink,
        validator: Arc<dyn LogValidator>,
    ) -> Self {
        Self {
            workflow,
            runner,
            stdout,
            stderr,
            validator,
            deadline: DEFAULT_STREAM_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

#[async_trait]
impl Probe for StreamingLogs {
    fn name(&self) -> &'static str {
        "streaming logs"
    }

    async fn observe(&self) -> Observation {
        let stop = CancellationToken::new();
        let trigger = stop.clone();
        let deadline = self.deadline;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            trigger.cancel();
        });

        let result = self
            .runner
            .run_until(&self.workflow.stream_logs(), stop)
            .await;
        timer.abort();

        match result {
            Ok(()) => {
                let logs = self.stdout.take();
                let errors = self.stderr.take();
                if self.validator.accepts(&logs) {
                    Observation::success(logs, errors)
                } else {
                    Observation::failure(
                        logs,
                        format!("streamed logs failed validation\n{errors}"),
                    )
                }
            }
            Err(err) => {
                Observation::failure(self.stdout.take(), failure_diagnostics(err, self.stderr.take()))
            }
        }
    }
}
