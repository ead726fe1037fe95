//! Ports between the measurement kernel and its collaborators.

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use vigil_domain::{CommandSpec, Observation};

/// One kind of observation performed against the target deployment.
/// Implementations own their dependencies outright so they can be exercised
/// with substitutes.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &'static str;

    /// Perform one unit of observation. Never errors: failures are reported
    /// through the observation along with whatever output was captured.
    async fn observe(&self) -> Observation;
}

/// Executes command specs, draining their combined output into the runner's
/// sinks as it goes, even when a command fails.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run in order, stopping at the first failure.
    async fn run_sequence(&self, specs: &[CommandSpec]) -> Result<()>;

    /// Launch all at once and wait for every one to finish; errors if any
    /// failed. No execution is abandoned when a sibling fails.
    async fn run_concurrent(&self, specs: &[CommandSpec]) -> Result<()>;

    /// Run in order until the token fires; the in-flight command is killed
    /// and the cut-short run reports Ok with its partial capture preserved.
    async fn run_until(&self, specs: &[CommandSpec], stop: CancellationToken) -> Result<()>;
}

/// Generates the command chains for provisioning and exercising one
/// tenant/application pair.
pub trait Workflow: Send + Sync {
    fn setup(&self) -> Vec<CommandSpec>;
    fn push(&self) -> Vec<CommandSpec>;
    fn delete(&self) -> Vec<CommandSpec>;
    fn map_route(&self) -> Vec<CommandSpec>;
    fn tear_down(&self) -> Vec<CommandSpec>;
    fn recent_logs(&self) -> Vec<CommandSpec>;
    fn stream_logs(&self) -> Vec<CommandSpec>;

    /// Reachable URL of the provisioned application.
    fn app_url(&self) -> String;
}

/// Decides whether captured log output contains the expected application
/// signal.
pub trait LogValidator: Send + Sync {
    fn accepts(&self, text: &str) -> bool;
}
