//! Upstream branch reconciliation.
//!
//! Before any operation that depends on a remote counterpart (push, PR
//! creation), make sure the local branch tracks `origin/<branch>`; publish
//! the branch with tracking when the remote side does not exist yet.

use super::{GitOutput, GitRunner};
use anyhow::Result;

/// Transient view of a branch, computed at reconcile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchState {
    pub name: String,
    pub has_upstream: bool,
}

/// Tagged reconciliation result. The orchestrator treats `Unknown` as a
/// warning rather than a failure, matching the tool's historical behavior,
/// but the diagnostic is preserved for callers that want to decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Upstream already existed; pulled when requested.
    Tracked,
    /// Remote branch was absent; published with tracking.
    Remediated,
    /// Setting the tracking reference failed for an unexpected reason.
    Unknown(String),
}

pub struct BranchReconciler<'a> {
    git: &'a dyn GitRunner,
}

const UPSTREAM_MISSING: &str = "does not exist";

impl<'a> BranchReconciler<'a> {
    pub fn new(git: &'a dyn GitRunner) -> Self {
        Self { git }
    }

    pub async fn branch_state(&self, branch: &str) -> Result<BranchState> {
        let has_upstream = self.git.remote_ref_exists(branch).await?;
        Ok(BranchState {
            name: branch.to_string(),
            has_upstream,
        })
    }

    /// Ensure `branch` has a tracked remote counterpart, publishing it when
    /// absent. `pull` requests a `git pull` once tracking is in place.
    pub async fn ensure_upstream(&self, branch: &str, pull: bool) -> Result<ReconcileOutcome> {
        let state = self.branch_state(branch).await?;

        if state.has_upstream {
            if pull {
                self.pull_best_effort().await?;
            }
            return Ok(ReconcileOutcome::Tracked);
        }

        tracing::info!("upstream branch for {branch} does not exist, creating upstream branch");

        let set = self.git.set_upstream(branch).await?;
        if set.success() {
            return Ok(ReconcileOutcome::Tracked);
        }

        // The one expected failure: origin/<branch> truly does not exist.
        // Publish the branch with tracking and continue.
        if set.stderr.contains(UPSTREAM_MISSING) {
            self.check(self.git.push(branch, true).await?, "git push -u")?;
            if pull {
                self.pull_best_effort().await?;
            }
            return Ok(ReconcileOutcome::Remediated);
        }

        Ok(ReconcileOutcome::Unknown(set.stderr.trim().to_string()))
    }

    /// A failing pull (conflict, diverged history) is surfaced as a
    /// warning; the surrounding workflow still reaches its commit and
    /// push steps, where the real state of the tree decides the outcome.
    async fn pull_best_effort(&self) -> Result<()> {
        tracing::info!("git pull");
        let pulled = self.git.pull().await?;
        if !pulled.success() {
            tracing::warn!("git pull failed: {}", pulled.stderr.trim());
        }
        Ok(())
    }

    fn check(&self, output: GitOutput, what: &str) -> Result<()> {
        if output.success() {
            Ok(())
        } else {
            anyhow::bail!("{what} failed: {}", output.stderr.trim())
        }
    }
}
