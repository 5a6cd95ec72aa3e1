//! Terraform invocation layer: composition of plan/apply pipelines and the
//! runner used for the single-directory paths.

pub mod compose;
pub mod execute;

pub use compose::{
    classify, compose_plan, compose_single, ComposePaths, Environment,
    EnvironmentPlan, FolderKind, PlanSpec, PLAN_ARTIFACT,
};
pub use execute::{run_environment_plans, EnvironmentResult};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::subprocess::{ProcessCommandBuilder, ProcessError, ProcessOutput, ProcessRunner};

#[async_trait]
pub trait TerraformRunner: Send + Sync {
    /// `terraform init -reconfigure`, with `--backend-config init.txt` when
    /// the backend-config file is present in the working directory.
    async fn init(&self, dir: &Path) -> Result<ProcessOutput, ProcessError>;

    /// Run a composed plan command string through the shell in `dir`.
    async fn run_shell(&self, dir: &Path, command: &str) -> Result<ProcessOutput, ProcessError>;

    /// Render the stored plan artifact to text.
    async fn show(&self, dir: &Path, no_color: bool) -> Result<ProcessOutput, ProcessError>;

    /// Apply the stored plan artifact.
    async fn apply(&self, dir: &Path) -> Result<ProcessOutput, ProcessError>;
}

pub struct TerraformRunnerImpl {
    runner: Arc<dyn ProcessRunner>,
}

impl TerraformRunnerImpl {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl TerraformRunner for TerraformRunnerImpl {
    async fn init(&self, dir: &Path) -> Result<ProcessOutput, ProcessError> {
        let mut builder = ProcessCommandBuilder::new("terraform")
            .args(["init", "-reconfigure"])
            .current_dir(dir);

        if dir.join("init.txt").exists() {
            builder = builder.args(["--backend-config", "init.txt"]);
        }

        self.runner.run(builder.build()).await
    }

    async fn run_shell(&self, dir: &Path, command: &str) -> Result<ProcessOutput, ProcessError> {
        self.runner
            .run(
                ProcessCommandBuilder::new("sh")
                    .args(["-c", command])
                    .current_dir(dir)
                    .build(),
            )
            .await
    }

    async fn show(&self, dir: &Path, no_color: bool) -> Result<ProcessOutput, ProcessError> {
        let mut builder = ProcessCommandBuilder::new("terraform")
            .args(["show", PLAN_ARTIFACT])
            .current_dir(dir);
        if no_color {
            builder = builder.arg("-no-color");
        }
        self.runner.run(builder.build()).await
    }

    async fn apply(&self, dir: &Path) -> Result<ProcessOutput, ProcessError> {
        self.runner
            .run(
                ProcessCommandBuilder::new("terraform")
                    .args(["apply", PLAN_ARTIFACT])
                    .current_dir(dir)
                    .build(),
            )
            .await
    }
}
