use std::sync::Arc;

use anyhow::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use vigil_domain::{CommandSpec, RunPhase};
use vigil_ports::{CommandRunner, Workflow};

use crate::scheduler::PeriodicScheduler;

/// Sequences one observation run: provision the main workflow, start every
/// scheduler, hold the window open for as long as the `while` command chain
/// runs, then aggregate all verdicts into a process exit code. Teardown is
/// always attempted, whatever happened before it.
pub struct Orchestrator {
    while_commands: Vec<CommandSpec>,
    workflow: Arc<dyn Workflow>,
    runner: Arc<dyn CommandRunner>,
    schedulers: Vec<PeriodicScheduler>,
    phase: RunPhase,
    failed: bool,
}

impl Orchestrator {
    pub fn new(
        while_commands: Vec<CommandSpec>,
        workflow: Arc<dyn Workflow>,
        runner: Arc<dyn CommandRunner>,
        schedulers: Vec<PeriodicScheduler>,
    ) -> Self {
        Self {
            while_commands,
            workflow,
            runner,
            schedulers,
            phase: RunPhase::NotStarted,
            failed: false,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Provisions the tenant and pushes the main application, so probes have
    /// something to observe. A failure here is captured by the caller's
    /// sinks and disables the measurement phase.
    pub async fn setup(&mut self, runner: &dyn CommandRunner) -> Result<()> {
        self.phase = RunPhase::SettingUp;
        let mut specs = self.workflow.setup();
        specs.extend(self.workflow.push());
        specs.extend(self.workflow.map_route());
        let result = runner.run_sequence(&specs).await;
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// Runs the observation window and returns the process exit code plus
    /// the `while` chain's own error, if any, for logging. With
    /// `perform_measurements` false nothing is probed and the run is
    /// already a failure.
    pub async fn run(&mut self, perform_measurements: bool) -> (i32, Option<Error>) {
        self.phase = RunPhase::Running;
        if !perform_measurements {
            self.failed = true;
            return (1, None);
        }

        let stop = CancellationToken::new();
        let mut verdicts = Vec::with_capacity(self.schedulers.len());
        let handles: Vec<_> = self
            .schedulers
            .drain(..)
            .map(|scheduler| tokio::spawn(scheduler.run(stop.clone())))
            .collect();

        info!(
            probes = handles.len(),
            "measurement window open, running workload under test"
        );
        let while_result = self.runner.run_sequence(&self.while_commands).await;
        stop.cancel();

        for handle in handles {
            match handle.await {
                Ok(verdict) => verdicts.push(verdict),
                Err(err) => {
                    self.failed = true;
                    error!("scheduler task did not complete: {err}");
                }
            }
        }

        let mut all_passed = true;
        for verdict in &verdicts {
            info!(
                probe = verdict.probe,
                recorded = verdict.recorded,
                failures = verdict.failures,
                allowed_failures = verdict.allowed_failures,
                passed = !verdict.failed(),
                "probe verdict"
            );
            if verdict.failed() {
                all_passed = false;
            }
        }

        match while_result {
            Ok(()) if all_passed && !self.failed => (0, None),
            Ok(()) => {
                self.failed = true;
                (1, None)
            }
            Err(err) => {
                self.failed = true;
                (1, Some(err))
            }
        }
    }

    /// Best-effort cleanup; the caller logs a failure but never escalates it.
    pub async fn tear_down(&mut self, runner: &dyn CommandRunner) -> Result<()> {
        self.phase = RunPhase::TearingDown;
        let result = runner.run_sequence(&self.workflow.tear_down()).await;
        self.phase = RunPhase::Done;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use anyhow::bail;
    use async_trait::async_trait;
    use tokio::time::sleep;

    use vigil_domain::{Observation, RetryPolicy};
    use vigil_ports::Probe;

    use super::*;

    struct FakeWorkflow;

    impl Workflow for FakeWorkflow {
        fn setup(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("provision")]
        }

        fn push(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("push")]
        }

        fn delete(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("delete")]
        }

        fn map_route(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("map-route")]
        }

        fn tear_down(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("deprovision")]
        }

        fn recent_logs(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("recent-logs")]
        }

        fn stream_logs(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("stream-logs")]
        }

        fn app_url(&self) -> String {
            "https://app.example.com".to_string()
        }
    }

    /// Records every spec it is told to run; optionally sleeps (to hold the
    /// window open under paused time) and optionally fails.
    struct RecordingRunner {
        ran: Mutex<Vec<String>>,
        delay: Duration,
        fail_with: Option<&'static str>,
    }

    impl RecordingRunner {
        fn instant() -> Self {
            Self {
                ran: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
                fail_with: None,
            }
        }

        fn holding(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::instant()
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                fail_with: Some(message),
                ..Self::instant()
            }
        }

        fn ran(&self) -> Vec<String> {
            self.ran.lock().expect("runner record lock poisoned").clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run_sequence(&self, specs: &[CommandSpec]) -> Result<()> {
            self.ran
                .lock()
                .expect("runner record lock poisoned")
                .extend(specs.iter().map(ToString::to_string));
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            if let Some(message) = self.fail_with {
                bail!(message);
            }
            Ok(())
        }

        async fn run_concurrent(&self, specs: &[CommandSpec]) -> Result<()> {
            self.run_sequence(specs).await
        }

        async fn run_until(&self, specs: &[CommandSpec], _stop: CancellationToken) -> Result<()> {
            self.run_sequence(specs).await
        }
    }

    struct CountingProbe {
        invocations: AtomicUsize,
        passes: bool,
    }

    impl CountingProbe {
        fn passing() -> Arc<Self> {
            Arc::new(Self {
                invocations: AtomicUsize::new(0),
                passes: true,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                invocations: AtomicUsize::new(0),
                passes: false,
            })
        }
    }

    #[async_trait]
    impl Probe for CountingProbe {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn observe(&self) -> Observation {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.passes {
                Observation::success("", "")
            } else {
                Observation::failure("", "synthetic failure")
            }
        }
    }

    fn scheduler_for(probe: Arc<CountingProbe>, allowed_failures: usize) -> PeriodicScheduler {
        PeriodicScheduler::new(
            probe,
            Duration::from_secs(1),
            allowed_failures,
            RetryPolicy::none(),
        )
    }

    fn orchestrator_with(
        runner: Arc<dyn CommandRunner>,
        schedulers: Vec<PeriodicScheduler>,
    ) -> Orchestrator {
        Orchestrator::new(
            vec![CommandSpec::new("workload")],
            Arc::new(FakeWorkflow),
            runner,
            schedulers,
        )
    }

    #[tokio::test]
    async fn skipped_measurement_fails_without_probing() {
        let probe = CountingProbe::passing();
        let mut orchestrator = orchestrator_with(
            Arc::new(RecordingRunner::instant()),
            vec![scheduler_for(probe.clone(), 0)],
        );
        let (exit_code, err) = orchestrator.run(false).await;
        assert_eq!(exit_code, 1);
        assert!(err.is_none());
        assert!(orchestrator.failed());
        assert_eq!(probe.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn setup_provisions_pushes_and_maps_a_route() {
        let runner = RecordingRunner::instant();
        let mut orchestrator =
            orchestrator_with(Arc::new(RecordingRunner::instant()), Vec::new());
        orchestrator.setup(&runner).await.expect("setup succeeds");
        assert_eq!(runner.ran(), ["provision", "push", "map-route"]);
        assert_eq!(orchestrator.phase(), RunPhase::SettingUp);
        assert!(!orchestrator.failed());
    }

    #[tokio::test]
    async fn setup_failure_marks_the_run_failed() {
        let runner = RecordingRunner::failing("no connection to platform");
        let mut orchestrator =
            orchestrator_with(Arc::new(RecordingRunner::instant()), Vec::new());
        assert!(orchestrator.setup(&runner).await.is_err());
        assert!(orchestrator.failed());
    }

    #[tokio::test(start_paused = true)]
    async fn green_window_exits_zero() {
        let probe = CountingProbe::passing();
        let mut orchestrator = orchestrator_with(
            Arc::new(RecordingRunner::holding(Duration::from_millis(2500))),
            vec![scheduler_for(probe.clone(), 0)],
        );
        let (exit_code, err) = orchestrator.run(true).await;
        assert_eq!(exit_code, 0);
        assert!(err.is_none());
        assert!(!orchestrator.failed());
        assert!(probe.invocations.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_beyond_tolerance_fails_the_run() {
        let probe = CountingProbe::failing();
        let mut orchestrator = orchestrator_with(
            Arc::new(RecordingRunner::holding(Duration::from_millis(2500))),
            vec![scheduler_for(probe, 0)],
        );
        let (exit_code, err) = orchestrator.run(true).await;
        assert_eq!(exit_code, 1);
        assert!(err.is_none(), "the workload itself succeeded");
        assert!(orchestrator.failed());
    }

    #[tokio::test(start_paused = true)]
    async fn workload_failure_fails_the_run_despite_green_probes() {
        let probe = CountingProbe::passing();
        let mut orchestrator = orchestrator_with(
            Arc::new(RecordingRunner::failing("upgrade broke")),
            vec![scheduler_for(probe, 0)],
        );
        let (exit_code, err) = orchestrator.run(true).await;
        assert_eq!(exit_code, 1);
        assert!(err.expect("workload error surfaced").to_string().contains("upgrade broke"));
    }

    #[tokio::test]
    async fn tear_down_always_runs_and_finishes_the_phases() {
        let runner = RecordingRunner::instant();
        let mut orchestrator =
            orchestrator_with(Arc::new(RecordingRunner::instant()), Vec::new());
        let (exit_code, _) = orchestrator.run(false).await;
        assert_eq!(exit_code, 1);
        orchestrator
            .tear_down(&runner)
            .await
            .expect("teardown succeeds");
        assert_eq!(runner.ran(), ["deprovision"]);
        assert_eq!(orchestrator.phase(), RunPhase::Done);
    }

    #[tokio::test]
    async fn tear_down_failure_is_reported_not_escalated() {
        let runner = RecordingRunner::failing("org already gone");
        let mut orchestrator =
            orchestrator_with(Arc::new(RecordingRunner::instant()), Vec::new());
        let result = orchestrator.tear_down(&runner).await;
        assert!(result.is_err());
        assert_eq!(orchestrator.phase(), RunPhase::Done);
    }
}
