//! Workflow orchestration.
//!
//! Each workflow sequences git, terraform and gh steps over the shared
//! [`WorkflowContext`]; nothing here touches a subprocess or the terminal
//! except through the context's injectable seams.

pub mod apply;
pub mod commit;
pub mod commit_push;
pub mod init;
pub mod init_plan;
pub mod plan;
pub mod pr;
pub mod switch;

pub use plan::PlanArgs;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ConfigResolver, DirectoryKind};
use crate::error::{Error, Result};
use crate::git::GitRunner;
use crate::interaction::{DefaultUserInteraction, UserInteraction};
use crate::subprocess::SubprocessManager;
use crate::terraform::classify;

/// Everything a workflow needs: the subprocess boundary, the operator's
/// terminal, and the per-run configuration snapshot.
pub struct WorkflowContext {
    pub subprocess: SubprocessManager,
    pub ui: Arc<dyn UserInteraction>,
    pub config: ConfigResolver,
}

impl WorkflowContext {
    pub fn new(
        subprocess: SubprocessManager,
        ui: Arc<dyn UserInteraction>,
        config: ConfigResolver,
    ) -> Self {
        Self {
            subprocess,
            ui,
            config,
        }
    }

    pub fn production() -> Self {
        let subprocess = SubprocessManager::production();
        let ui = Arc::new(DefaultUserInteraction::new(subprocess.runner()));
        Self::new(subprocess, ui, ConfigResolver::from_file())
    }
}

pub(crate) async fn require_repo(ctx: &WorkflowContext) -> Result<()> {
    if ctx.subprocess.git().is_repo().await {
        Ok(())
    } else {
        Err(Error::NotInRepo)
    }
}

/// Map a `-d <name>` flag to `<sysconf>/<tf|tf2>/<name>` and verify the
/// directory exists before any terraform step runs. `None` (or a blank
/// name) means "operate in the current directory".
pub(crate) async fn resolve_scoped_dir(
    ctx: &WorkflowContext,
    directory: Option<&str>,
) -> Result<Option<PathBuf>> {
    let Some(name) = directory.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    let sysconf = ctx
        .config
        .resolve(DirectoryKind::Sysconf, ctx.ui.as_ref())
        .await?;
    let scoped = PathBuf::from(&sysconf)
        .join(classify(name).as_str())
        .join(name);

    if !scoped.is_dir() {
        return Err(Error::MissingDirectory {
            directory: name.to_string(),
            sysconf_dir: sysconf,
        });
    }

    Ok(Some(scoped))
}

/// Working directory for a terraform workflow: the scoped directory when a
/// `-d` flag was given, the process working directory otherwise.
pub(crate) async fn working_dir(
    ctx: &WorkflowContext,
    directory: Option<&str>,
) -> Result<PathBuf> {
    match resolve_scoped_dir(ctx, directory).await? {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}
