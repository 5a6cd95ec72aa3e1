//! Environment initialization: refresh credentials and the checkout, then
//! `terraform init`.

use crate::error::{Error, Result};
use crate::git::GitRunner;
use crate::subprocess::{ProcessCommandBuilder, ProcessRunner};
use crate::terraform::TerraformRunner;

use super::WorkflowContext;

const NO_TRACKING: &str = "no tracking information";

/// Check the active AWS session and start an SSO login when it has
/// expired. The identity call's own diagnostics are discarded; only
/// its exit status matters.
async fn ensure_aws_session(ctx: &WorkflowContext) -> Result<()> {
    let runner = ctx.subprocess.runner();
    let identity = runner
        .run(
            ProcessCommandBuilder::new("aws")
                .args(["sts", "get-caller-identity"])
                .suppress_stderr()
                .build(),
        )
        .await?;
    if identity.success() {
        return Ok(());
    }

    ctx.ui.display_warning("AWS credentials expired");
    ctx.ui.display_progress("getting new AWS credentials");
    let status = runner
        .run_interactive(
            ProcessCommandBuilder::new("aws")
                .args(["sso", "login"])
                .build(),
        )
        .await?;
    if !status.success() {
        return Err(Error::tool("aws", "sso login failed"));
    }
    Ok(())
}

/// Refresh the AWS session, pull the current checkout (tolerating an
/// untracked branch with a warning), then initialize terraform in the
/// scoped or current directory. The backend-config flag is added
/// automatically when `init.txt` exists in the target directory.
pub async fn run(ctx: &WorkflowContext, directory: Option<&str>) -> Result<()> {
    let dir = super::working_dir(ctx, directory).await?;

    ensure_aws_session(ctx).await?;

    let git = ctx.subprocess.git();
    if git.is_repo().await {
        let pulled = git.pull().await?;
        if !pulled.success() {
            if pulled.stderr.contains(NO_TRACKING) {
                ctx.ui.display_warning(pulled.stderr.trim());
            } else {
                tracing::debug!("pull before init failed: {}", pulled.stderr.trim());
            }
        }
    }

    ctx.ui
        .display_progress(&format!("Initializing terraform in {}", dir.display()));
    let initialized = ctx.subprocess.terraform().init(&dir).await?;
    if !initialized.success() {
        return Err(Error::tool("terraform", initialized.stderr.trim()));
    }
    ctx.ui.display_success("terraform init complete");
    Ok(())
}
