use std::sync::Arc;

use async_trait::async_trait;

use vigil_domain::{Observation, OutputSink};
use vigil_ports::{CommandRunner, Probe, Workflow};

use crate::failure_diagnostics;

/// Pushes the sample application and deletes it again, through a runner and
/// sinks this probe owns outright. Both chains must succeed.
pub struct AppPushability {
    workflow: Arc<dyn Workflow>,
    runner: Arc<dyn CommandRunner>,
    stdout: OutputSink,
    stderr: OutputSink,
}

impl AppPushability {
    pub fn new(
        workflow: Arc<dyn Workflow>,
        runner: Arc<dyn CommandRunner>,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> Self {
        Self {
            workflow,
            runner,
            stdout,
            stderr,
        }
    }
}

#[async_trait]
impl Probe for AppPushability {
    fn name(&self) -> &'static str {
        "app pushability"
    }

    async fn observe(&self) -> Observation {
        let mut specs = self.workflow.push();
        specs.extend(self.workflow.delete());
        match self.runner.run_sequence(&specs).await {
            Ok(()) => {
                self.stdout.take();
                self.stderr.take();
                Observation::success("", "")
            }
            Err(err) => {
                Observation::failure(self.stdout.take(), failure_diagnostics(err, self.stderr.take()))
            }
        }
    }
}
