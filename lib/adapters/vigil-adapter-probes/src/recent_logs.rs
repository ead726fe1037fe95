use std::sync::Arc;

use async_trait::async_trait;

use vigil_domain::{Observation, OutputSink};
use vigil_ports::{CommandRunner, LogValidator, Probe, Workflow};

use crate::failure_diagnostics;

/// Fetches the application's recent logs and hands the captured stdout to
/// the validator. Passes only when the fetch succeeds and the validator
/// accepts the content.
pub struct RecentLogs {
    workflow: Arc<dyn Workflow>,
    runner: Arc<dyn CommandRunner>,
    stdout: OutputSink,
    stderr: OutputSink,
    validator: Arc<dyn LogValidator>,
}

impl RecentLogs {
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
        }
    }
}

#[async_trait]
impl Probe for RecentLogs {
    fn name(&self) -> &'static str {
        "recent logs"
    }

    async fn observe(&self) -> Observation {
        match self.runner.run_sequence(&self.workflow.recent_logs()).await {
            Ok(()) => {
                let logs = self.stdout.take();
                let errors = self.stderr.take();
                if self.validator.accepts(&logs) {
                    Observation::success(logs, errors)
                } else {
                    Observation::failure(
                        logs,
                        format!("fetched logs failed validation\n{errors}"),
                    )
                }
            }
            Err(err) => {
                Observation::failure(self.stdout.take(), failure_diagnostics(err, self.stderr.take()))
            }
        }
    }
}
