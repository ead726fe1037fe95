use std::path::PathBuf;

use uuid::Uuid;

use vigil_domain::{CommandSpec, config::PlatformConfig};
use vigil_ports::Workflow;

/// Generates `cf` CLI command chains for one generated org/space/app. Each
/// chain re-authenticates, so an expired session surfaces as a transient
/// failure on whichever probe hits it first. The CF_HOME scratch dir keeps
/// this workflow's session separate from every other runner's.
#[derive(Debug, Clone)]
pub struct PlatformWorkflow {
    platform: PlatformConfig,
    org: String,
    space: String,
    quota: String,
    app: String,
    app_path: PathBuf,
    app_command: String,
    home_dir: PathBuf,
}

impl PlatformWorkflow {
    pub fn new(
        platform: PlatformConfig,
        app_path: PathBuf,
        app_command: String,
        home_dir: PathBuf,
    ) -> Self {
        Self {
            platform,
            org: format!("vigil-org-{}", Uuid::new_v4()),
            space: format!("vigil-space-{}", Uuid::new_v4()),
            quota: format!("vigil-quota-{}", Uuid::new_v4()),
            app: format!("vigil-app-{}", Uuid::new_v4()),
            app_path,
            app_command,
            home_dir,
        }
    }

    /// Same org/space/app identity, different CF_HOME. Probes drive the
    /// orchestrator's workflow through their own session dirs.
    pub fn with_home(&self, home_dir: PathBuf) -> Self {
        Self {
            home_dir,
            ..self.clone()
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn app_name(&self) -> &str {
        &self.app
    }

    fn cf<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new("cf")
            .args(args)
            .env("CF_HOME", self.home_dir.display().to_string())
    }

    fn api(&self) -> CommandSpec {
        self.cf(["api", &self.platform.api, "--skip-ssl-validation"])
    }

    fn auth(&self) -> CommandSpec {
        self.cf([
            "auth",
            &self.platform.admin_user,
            &self.platform.admin_password,
        ])
    }

    fn target(&self) -> CommandSpec {
        self.cf(["target", "-o", &self.org, "-s", &self.space])
    }

    fn login(&self) -> Vec<CommandSpec> {
        vec![self.api(), self.auth(), self.target()]
    }
}

impl Workflow for PlatformWorkflow {
    fn setup(&self) -> Vec<CommandSpec> {
        vec![
            self.api(),
            self.auth(),
            self.cf([
                "create-quota",
                &self.quota,
                "-m",
                "10G",
                "-i",
                "1G",
                "-r",
                "1000",
                "-s",
                "100",
            ]),
            self.cf(["create-org", &self.org]),
            self.cf(["set-quota", &self.org, &self.quota]),
            self.cf(["create-space", &self.space, "-o", &self.org]),
            self.target(),
        ]
    }

    fn push(&self) -> Vec<CommandSpec> {
        let mut chain = self.login();
        chain.push(self.cf([
            "push",
            &self.app,
            "-p",
            &self.app_path.display().to_string(),
            "-b",
            "binary_buildpack",
            "-c",
            &self.app_command,
        ]));
        chain
    }

    fn delete(&self) -> Vec<CommandSpec> {
        let mut chain = self.login();
        chain.push(self.cf(["delete", &self.app, "-f", "-r"]));
        chain
    }

    fn map_route(&self) -> Vec<CommandSpec> {
        let mut chain = self.login();
        chain.push(self.cf([
            "map-route",
            &self.app,
            &self.platform.app_domain,
            "--hostname",
            &self.app,
        ]));
        chain
    }

    fn tear_down(&self) -> Vec<CommandSpec> {
        vec![
            self.api(),
            self.auth(),
            self.cf(["delete-org", &self.org, "-f"]),
            self.cf(["logout"]),
        ]
    }

    fn recent_logs(&self) -> Vec<CommandSpec> {
        let mut chain = self.login();
        chain.push(self.cf(["logs", &self.app, "--recent"]));
        chain
    }

    fn stream_logs(&self) -> Vec<CommandSpec> {
        let mut chain = self.login();
        chain.push(self.cf(["logs", &self.app]));
        chain
    }

    fn app_url(&self) -> String {
        format!("https://{}.{}", self.app, self.platform.app_domain)
    }
}
