use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use vigil_domain::{CommandSpec, OutputSink};
use vigil_ports::CommandRunner;

/// Runs command specs as subprocesses. In captured mode both output streams
/// drain into the runner's sinks, even when a command fails, so diagnostics
/// are never lost; in inherited mode output flows straight to this
/// process's stdio.
pub struct ExecRunner {
    output: OutputMode,
}

#[derive(Clone)]
enum OutputMode {
    Captured { stdout: OutputSink, stderr: OutputSink },
    Inherited,
}

impl ExecRunner {
    pub fn new(stdout: OutputSink, stderr: OutputSink) -> Self {
        Self {
            output: OutputMode::Captured { stdout, stderr },
        }
    }

    /// Runner plus handles to the sinks it drains into.
    pub fn buffered() -> (Self, OutputSink, OutputSink) {
        let stdout = OutputSink::new();
        let stderr = OutputSink::new();
        (Self::new(stdout.clone(), stderr.clone()), stdout, stderr)
    }

    /// Runner whose children write to this process's own stdout/stderr.
    pub fn inherited() -> Self {
        Self {
            output: OutputMode::Inherited,
        }
    }
}

#[async_trait]
impl CommandRunner for ExecRunner {
    async fn run_sequence(&self, specs: &[CommandSpec]) -> Result<()> {
        for spec in specs {
            execute(spec.clone(), self.output.clone()).await?;
        }
        Ok(())
    }

    async fn run_concurrent(&self, specs: &[CommandSpec]) -> Result<()> {
        let mut executions = JoinSet::new();
        for spec in specs {
            executions.spawn(execute(spec.clone(), self.output.clone()));
        }

        // Every execution is joined before returning, failed siblings or not.
        let mut failures = Vec::new();
        while let Some(joined) = executions.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(format!("{err:#}")),
                Err(err) => failures.push(format!("execution task failed: {err}")),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            bail!(
                "{} command(s) failed: {}",
                failures.len(),
                failures.join("; ")
            )
        }
    }

    async fn run_until(&self, specs: &[CommandSpec], stop: CancellationToken) -> Result<()> {
        for spec in specs {
            if execute_cancellable(spec.clone(), self.output.clone(), &stop).await? {
                return Ok(());
            }
        }
        Ok(())
    }
}

async fn execute(spec: CommandSpec, output: OutputMode) -> Result<()> {
    let never = CancellationToken::new();
    execute_cancellable(spec, output, &never).await.map(|_| ())
}

/// Runs one spec to completion or until the token fires. Returns true when
/// the run was cut short by cancellation; partial output stays in the sinks.
async fn execute_cancellable(
    spec: CommandSpec,
    output: OutputMode,
    stop: &CancellationToken,
) -> Result<bool> {
    debug!(command = %spec, "running");
    let mut child = spawn(&spec, &output)?;

    let mut drains = JoinSet::new();
    if let OutputMode::Captured { stdout, stderr } = &output {
        if let Some(pipe) = child.stdout.take() {
            drains.spawn(drain_into(pipe, stdout.clone()));
        }
        if let Some(pipe) = child.stderr.take() {
            drains.spawn(drain_into(pipe, stderr.clone()));
        }
    }

    let waited = tokio::select! {
        biased;
        status = child.wait() => Some(status),
        _ = stop.cancelled() => None,
    };
    let status = match waited {
        Some(status) => Some(status.with_context(|| format!("failed waiting on `{spec}`"))?),
        None => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            None
        }
    };

    // Pipes hit EOF once the child is gone; drain whatever made it out.
    while drains.join_next().await.is_some() {}

    match status {
        None => Ok(true),
        Some(status) if status.success() => Ok(false),
        Some(status) => bail!("`{spec}` exited with {status}"),
    }
}

fn spawn(spec: &CommandSpec, output: &OutputMode) -> Result<Child> {
    let mut command = Command::new(spec.program());
    command.args(spec.arg_list()).stdin(Stdio::null()).kill_on_drop(true);
    match output {
        OutputMode::Captured { .. } => {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        OutputMode::Inherited => {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
    }
    if let Some(dir) = spec.dir() {
        command.current_dir(dir);
    }
    for (key, value) in spec.env_list() {
        command.env(key, value);
    }
    command
        .spawn()
        .with_context(|| format!("failed to start `{spec}`"))
}

async fn drain_into<R: AsyncReadExt + Unpin>(mut pipe: R, sink: OutputSink) {
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => sink.append(&String::from_utf8_lossy(&chunk[..read])),
        }
    }
}
