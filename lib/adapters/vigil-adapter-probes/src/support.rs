//! Substitute collaborators for probe tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use vigil_domain::{CommandSpec, OutputSink};
use vigil_ports::{CommandRunner, LogValidator, Workflow};

pub struct FakeStep {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
    pub hang_until_cancelled: bool,
}

impl FakeStep {
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            error: None,
            hang_until_cancelled: false,
        }
    }

    pub fn fail(stdout: &str, stderr: &str, error: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            error: Some(error.to_string()),
            hang_until_cancelled: false,
        }
    }

    pub fn hang(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            error: None,
            hang_until_cancelled: true,
        }
    }
}

/// Plays back one scripted step per call, writing into the shared sinks the
/// way the real runner would.
pub struct FakeRunner {
    stdout: OutputSink,
    stderr: OutputSink,
    steps: Mutex<VecDeque<FakeStep>>,
    pub calls: AtomicUsize,
}

impl FakeRunner {
    pub fn new(stdout: OutputSink, stderr: OutputSink, steps: Vec<FakeStep>) -> Self {
        Self {
            stdout,
            stderr,
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn play(&self) -> FakeStep {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.steps
            .lock()
            .expect("fake runner script lock poisoned")
            .pop_front()
            .expect("fake runner script exhausted")
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run_sequence(&self, _specs: &[CommandSpec]) -> Result<()> {
        let step = self.play();
        self.stdout.append(&step.stdout);
        self.stderr.append(&step.stderr);
        match step.error {
            None => Ok(()),
            Some(message) => Err(anyhow!(message)),
        }
    }

    async fn run_concurrent(&self, specs: &[CommandSpec]) -> Result<()> {
        self.run_sequence(specs).await
    }

    async fn run_until(&self, _specs: &[CommandSpec], stop: CancellationToken) -> Result<()> {
        let step = self.play();
        self.stdout.append(&step.stdout);
        self.stderr.append(&step.stderr);
        if step.hang_until_cancelled {
            stop.cancelled().await;
            return Ok(());
        }
        match step.error {
            None => Ok(()),
            Some(message) => Err(anyhow!(message)),
        }
    }
}

pub struct StaticWorkflow;

impl Workflow for StaticWorkflow {
    fn setup(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-setup")]
    }

    fn push(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-push")]
    }

    fn delete(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-delete")]
    }

    fn map_route(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-map-route")]
    }

    fn tear_down(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-tear-down")]
    }

    fn recent_logs(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-recent-logs")]
    }

    fn stream_logs(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("fake-stream-logs")]
    }

    fn app_url(&self) -> String {
        "https://fake-app.example.com".to_string()
    }
}

pub struct FixedValidator {
    pub accept: bool,
}

impl LogValidator for FixedValidator {
    fn accepts(&self, _text: &str) -> bool {
        self.accept
    }
}
