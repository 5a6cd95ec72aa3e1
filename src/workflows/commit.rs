//! Stage-everything-and-commit.

use crate::error::{Error, Result};
use crate::git::GitRunner;

use super::WorkflowContext;

pub(crate) const CLEAN_TREE: &str = "nothing to commit, working tree clean";

/// Stage all changes under the repository root and create a commit. A
/// clean work tree is reported to the operator and treated as success so
/// the surrounding workflow can continue to the push or PR step.
pub async fn run(ctx: &WorkflowContext, message: &str, signed: bool) -> Result<()> {
    super::require_repo(ctx).await?;

    let git = ctx.subprocess.git();
    let root = git.repo_root().await?;

    let staged = git.stage_all(&root).await?;
    if !staged.success() {
        return Err(Error::tool("git", staged.stderr.trim()));
    }

    let committed = git.commit(&root, message, signed).await?;
    if !committed.success() {
        if committed.stdout.contains(CLEAN_TREE) {
            ctx.ui.display_info(CLEAN_TREE);
            return Ok(());
        }
        let diagnostic = if committed.stderr.trim().is_empty() {
            committed.stdout.trim()
        } else {
            committed.stderr.trim()
        };
        return Err(Error::tool("git", diagnostic));
    }

    let summary = committed.stdout.trim();
    if !summary.is_empty() {
        ctx.ui.display_info(summary);
    }
    Ok(())
}
