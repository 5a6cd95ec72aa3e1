//! Pull, commit, and push in one pass.

use crate::error::{Error, Result};
use crate::git::{BranchReconciler, GitRunner, ReconcileOutcome};

use super::{commit, WorkflowContext};

const PROTECTED: &str = "Protected branch update failed";
const NO_UPSTREAM: &str = "has no upstream branch";

/// Reconcile the branch's upstream (pulling when one exists), commit all
/// staged work, then push. A protected-branch rejection is fatal with the
/// server's own wording; a missing-upstream push gets exactly one
/// corrective `push -u` retry.
pub async fn run(ctx: &WorkflowContext, message: &str, signed: bool) -> Result<()> {
    super::require_repo(ctx).await?;

    let git = ctx.subprocess.git();
    let branch = git.current_branch().await?;

    let reconciler = BranchReconciler::new(&git);
    if let ReconcileOutcome::Unknown(diagnostic) =
        reconciler.ensure_upstream(&branch, true).await?
    {
        ctx.ui.display_warning(&diagnostic);
    }

    commit::run(ctx, message, signed).await?;

    ctx.ui.display_progress("Pushing changes...");
    let pushed = git.push(&branch, false).await?;
    if pushed.success() {
        return Ok(());
    }

    if pushed.stderr.contains(PROTECTED) {
        return Err(Error::ProtectedBranch);
    }

    if pushed.stderr.contains(NO_UPSTREAM) {
        let retried = git.push(&branch, true).await?;
        if retried.success() {
            return Ok(());
        }
        return Err(Error::tool("git", retried.stderr.trim()));
    }

    Err(Error::tool("git", pushed.stderr.trim()))
}
