//! Apply the stored plan artifact.

use crate::error::{Error, Result};
use crate::terraform::TerraformRunner;

use super::WorkflowContext;

/// `terraform apply crplan` in the scoped or current directory. Only a
/// previously planned artifact is applied; there is no plan-free apply.
pub async fn run(ctx: &WorkflowContext, directory: Option<&str>) -> Result<()> {
    let dir = super::working_dir(ctx, directory).await?;

    ctx.ui
        .display_progress(&format!("Applying stored plan in {}", dir.display()));
    let applied = ctx.subprocess.terraform().apply(&dir).await?;
    if !applied.success() {
        return Err(Error::tool("terraform", applied.stderr.trim()));
    }
    ctx.ui.display_success("terraform apply complete");
    Ok(())
}
