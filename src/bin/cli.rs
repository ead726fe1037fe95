use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vigil::setup;
use vigil_adapter_exec::{ExecRunner, PlatformWorkflow};
use vigil_domain::{CommandLine, OutputSink, VigilConfig};
use vigil_ports::{CommandRunner, Workflow};
use vigil_runtime::Orchestrator;

#[derive(Parser)]
#[command(name = "vigil")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long = "config-file")]
    config_file: Option<PathBuf>,

    /// Print the version and exit
    #[arg(short = 'v', long = "version")]
    show_version: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if cli.show_version {
        println!("version: {}", vigil::VERSION);
        return;
    }

    let Some(config_path) = cli.config_file else {
        error!("failed to load config: '--config-file' flag required");
        std::process::exit(1);
    };
    let config = match VigilConfig::load_from_path(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load config: {err:#}");
            std::process::exit(1);
        }
    };

    match run(config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(config: VigilConfig) -> Result<i32> {
    let mut perform_measurements = true;
    let (setup_runner, setup_out, setup_err) = ExecRunner::buffered();

    let push_workflow = PlatformWorkflow::new(
        config.cf.clone(),
        config.app_path.clone(),
        config.app_command.clone(),
        setup::session_dir()?,
    );
    info!(org = push_workflow.org(), "setting up push workflow");
    if let Err(err) = setup_runner.run_sequence(&push_workflow.setup()).await {
        log_phase_failure("push workflow setup", &err, &setup_out, &setup_err);
        perform_measurements = false;
    } else {
        info!("finished setting up push workflow");
    }

    let main_workflow = PlatformWorkflow::new(
        config.cf.clone(),
        config.app_path.clone(),
        config.app_command.clone(),
        setup::session_dir()?,
    );
    let schedulers = setup::build_schedulers(&config, &main_workflow, &push_workflow)?;
    let while_commands = config
        .while_commands
        .iter()
        .map(CommandLine::to_spec)
        .collect();

    let mut orchestrator = Orchestrator::new(
        while_commands,
        Arc::new(main_workflow.clone()),
        Arc::new(ExecRunner::inherited()),
        schedulers,
    );

    info!(org = main_workflow.org(), "setting up main workflow");
    if let Err(err) = orchestrator.setup(&setup_runner).await {
        log_phase_failure("main workflow setup", &err, &setup_out, &setup_err);
        perform_measurements = false;
    } else {
        info!("finished setting up main workflow");
    }

    let (exit_code, while_err) = orchestrator.run(perform_measurements).await;
    if let Some(err) = while_err {
        error!("failed run: {err:#}");
    }

    info!("tearing down");
    if let Err(err) = orchestrator.tear_down(&setup_runner).await {
        log_phase_failure("main workflow teardown", &err, &setup_out, &setup_err);
    }
    if let Err(err) = setup_runner.run_sequence(&push_workflow.tear_down()).await {
        log_phase_failure("push workflow teardown", &err, &setup_out, &setup_err);
    }
    info!("finished tearing down");

    Ok(exit_code)
}

/// Dumps and clears the phase's captured output so the next phase starts
/// with empty sinks.
fn log_phase_failure(what: &str, err: &anyhow::Error, stdout: &OutputSink, stderr: &OutputSink) {
    error!(
        "failed {what}: {err:#}\nstdout:\n{}\nstderr:\n{}",
        stdout.take(),
        stderr.take()
    );
}
