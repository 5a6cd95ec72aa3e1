//! Git operations layer.
//!
//! Thin trait over the subprocess boundary; every operation maps to one git
//! invocation and surfaces the tool's own diagnostic text on failure.

pub mod reconcile;

pub use reconcile::{BranchReconciler, BranchState, ReconcileOutcome};

use async_trait::async_trait;
use std::sync::Arc;

use crate::subprocess::{ExitStatus, ProcessCommandBuilder, ProcessError, ProcessRunner};

/// Outcome of a git invocation: exit status plus captured text, so callers
/// can match on specific diagnostics ("nothing to commit", protected branch)
/// instead of treating every non-zero exit the same way.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Whether the current directory is inside a git work tree.
    async fn is_repo(&self) -> bool;

    async fn current_branch(&self) -> Result<String, ProcessError>;

    async fn repo_root(&self) -> Result<String, ProcessError>;

    /// The remote's HEAD branch (e.g. "main").
    async fn default_branch(&self) -> Result<String, ProcessError>;

    /// The nearest origin branch decorating HEAD^, used as a PR base.
    /// Falls back to the default branch when no decoration is found.
    async fn base_branch(&self) -> Result<String, ProcessError>;

    async fn latest_commit_message(&self) -> Result<String, ProcessError>;

    /// Whether `refs/heads/<branch>` exists on origin.
    async fn remote_ref_exists(&self, branch: &str) -> Result<bool, ProcessError>;

    /// `git branch --set-upstream-to=origin/<branch> <branch>`.
    async fn set_upstream(&self, branch: &str) -> Result<GitOutput, ProcessError>;

    async fn push(&self, branch: &str, with_tracking: bool) -> Result<GitOutput, ProcessError>;

    async fn pull(&self) -> Result<GitOutput, ProcessError>;

    async fn stage_all(&self, root: &str) -> Result<GitOutput, ProcessError>;

    async fn commit(
        &self,
        root: &str,
        message: &str,
        signed: bool,
    ) -> Result<GitOutput, ProcessError>;

    async fn checkout(&self, branch: &str) -> Result<GitOutput, ProcessError>;

    async fn checkout_new(&self, branch: &str) -> Result<GitOutput, ProcessError>;
}

pub struct GitRunnerImpl {
    runner: Arc<dyn ProcessRunner>,
}

impl GitRunnerImpl {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    async fn git(&self, args: &[&str]) -> Result<GitOutput, ProcessError> {
        let output = self
            .runner
            .run(ProcessCommandBuilder::new("git").args(args).build())
            .await?;

        Ok(GitOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Run git expecting success; non-zero exit becomes an error.
    async fn git_ok(&self, args: &[&str]) -> Result<GitOutput, ProcessError> {
        let output = self.git(args).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(ProcessError::ExitCode(output.status.code().unwrap_or(1)))
        }
    }
}

/// Extract the first origin-decorated branch from `git log --pretty=%D` output.
/// Decorations look like "origin/feature-x, feature-x" or "HEAD -> main, origin/main".
fn parse_base_branch(decorations: &str) -> Option<String> {
    for line in decorations.lines() {
        for item in line.split(',') {
            let item = item.trim();
            let item = item.strip_prefix("HEAD -> ").unwrap_or(item);
            if let Some(branch) = item.strip_prefix("origin/") {
                if branch != "HEAD" && !branch.is_empty() {
                    return Some(branch.to_string());
                }
            }
        }
    }
    None
}

/// Parse the HEAD branch line of `git remote show origin` output.
fn parse_head_branch(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("HEAD branch:")
            .map(|rest| rest.trim().to_string())
    })
}

#[async_trait]
impl GitRunner for GitRunnerImpl {
    async fn is_repo(&self) -> bool {
        self.runner
            .run(
                ProcessCommandBuilder::new("git")
                    .args(["rev-parse", "--is-inside-work-tree"])
                    .suppress_stderr()
                    .build(),
            )
            .await
            .map(|output| output.success())
            .unwrap_or(false)
    }

    async fn current_branch(&self) -> Result<String, ProcessError> {
        let output = self.git_ok(&["symbolic-ref", "--short", "HEAD"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    async fn repo_root(&self) -> Result<String, ProcessError> {
        let output = self.git_ok(&["rev-parse", "--show-toplevel"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    async fn default_branch(&self) -> Result<String, ProcessError> {
        let output = self.git_ok(&["remote", "show", "origin"]).await?;
        Ok(parse_head_branch(&output.stdout).unwrap_or_default())
    }

    async fn base_branch(&self) -> Result<String, ProcessError> {
        let output = self
            .git(&["log", "--pretty=format:%D", "HEAD^"])
            .await?;

        if output.success() {
            if let Some(base) = parse_base_branch(&output.stdout) {
                return Ok(base);
            }
        } else {
            tracing::warn!("could not inspect HEAD^ decorations: {}", output.stderr.trim());
        }

        self.default_branch().await
    }

    async fn latest_commit_message(&self) -> Result<String, ProcessError> {
        let output = self.git_ok(&["log", "-1", "--pretty=%B"]).await?;
        Ok(output
            .stdout
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }

    async fn remote_ref_exists(&self, branch: &str) -> Result<bool, ProcessError> {
        let refspec = format!("refs/heads/{branch}");
        let output = self
            .git_ok(&["ls-remote", "--heads", "origin", &refspec])
            .await?;
        Ok(!output.stdout.trim().is_empty())
    }

    async fn set_upstream(&self, branch: &str) -> Result<GitOutput, ProcessError> {
        let upstream = format!("--set-upstream-to=origin/{branch}");
        self.git(&["branch", &upstream, branch]).await
    }

    async fn push(&self, branch: &str, with_tracking: bool) -> Result<GitOutput, ProcessError> {
        if with_tracking {
            self.git(&["push", "-u", "origin", branch]).await
        } else {
            self.git(&["push"]).await
        }
    }

    async fn pull(&self) -> Result<GitOutput, ProcessError> {
        self.git(&["pull"]).await
    }

    async fn stage_all(&self, root: &str) -> Result<GitOutput, ProcessError> {
        let output = self
            .runner
            .run(
                ProcessCommandBuilder::new("git")
                    .args(["add", "."])
                    .current_dir(std::path::Path::new(root))
                    .build(),
            )
            .await?;
        Ok(GitOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn commit(
        &self,
        root: &str,
        message: &str,
        signed: bool,
    ) -> Result<GitOutput, ProcessError> {
        let mut args = vec!["commit"];
        if signed {
            args.push("-S");
        }
        args.push("-m");
        args.push(message);

        let output = self
            .runner
            .run(
                ProcessCommandBuilder::new("git")
                    .args(&args)
                    .current_dir(std::path::Path::new(root))
                    .build(),
            )
            .await?;
        Ok(GitOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn checkout(&self, branch: &str) -> Result<GitOutput, ProcessError> {
        self.git(&["checkout", branch]).await
    }

    async fn checkout_new(&self, branch: &str) -> Result<GitOutput, ProcessError> {
        self.git(&["checkout", "-b", branch]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;

    fn git_with(mock: MockProcessRunner) -> GitRunnerImpl {
        GitRunnerImpl::new(Arc::new(mock))
    }

    #[test]
    fn test_parse_base_branch_first_origin_decoration() {
        let out = "HEAD -> feature, origin/develop, tag: v1\norigin/main";
        assert_eq!(parse_base_branch(out), Some("develop".to_string()));
    }

    #[test]
    fn test_parse_base_branch_skips_head_pointer() {
        assert_eq!(parse_base_branch("origin/HEAD, origin/main"), Some("main".to_string()));
        assert_eq!(parse_base_branch("tag: v2, feature"), None);
        assert_eq!(parse_base_branch(""), None);
    }

    #[test]
    fn test_parse_head_branch() {
        let out = "* remote origin\n  Fetch URL: git@example.com:x.git\n  HEAD branch: main\n";
        assert_eq!(parse_head_branch(out), Some("main".to_string()));
        assert_eq!(parse_head_branch("no head line"), None);
    }

    #[tokio::test]
    async fn test_is_repo_true() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args == ["rev-parse", "--is-inside-work-tree"])
            .returns_stdout("true\n")
            .returns_success()
            .finish();

        assert!(git_with(mock).is_repo().await);
    }

    #[tokio::test]
    async fn test_is_repo_false_on_error() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args == ["rev-parse", "--is-inside-work-tree"])
            .returns_exit_code(128)
            .finish();

        assert!(!git_with(mock).is_repo().await);
    }

    #[tokio::test]
    async fn test_current_branch_trims_newline() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args == ["symbolic-ref", "--short", "HEAD"])
            .returns_stdout("feature/x\n")
            .returns_success()
            .finish();

        assert_eq!(git_with(mock).current_branch().await.unwrap(), "feature/x");
    }

    #[tokio::test]
    async fn test_remote_ref_exists() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| {
                args == ["ls-remote", "--heads", "origin", "refs/heads/feature/x"]
            })
            .returns_stdout("abc123\trefs/heads/feature/x\n")
            .returns_success()
            .finish();

        assert!(git_with(mock).remote_ref_exists("feature/x").await.unwrap());
    }

    #[tokio::test]
    async fn test_remote_ref_absent_when_listing_empty() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args.first().map(String::as_str) == Some("ls-remote"))
            .returns_stdout("")
            .returns_success()
            .finish();

        assert!(!git_with(mock).remote_ref_exists("feature/x").await.unwrap());
    }

    #[tokio::test]
    async fn test_latest_commit_message_first_line_only() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args == ["log", "-1", "--pretty=%B"])
            .returns_stdout("subject line\n\nbody paragraph\n")
            .returns_success()
            .finish();

        assert_eq!(
            git_with(mock).latest_commit_message().await.unwrap(),
            "subject line"
        );
    }

    #[tokio::test]
    async fn test_base_branch_falls_back_to_default() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args == ["log", "--pretty=format:%D", "HEAD^"])
            .returns_stdout("tag: v1\n")
            .returns_success()
            .finish();
        mock.expect_command("git")
            .with_args(|args| args == ["remote", "show", "origin"])
            .returns_stdout("  HEAD branch: main\n")
            .returns_success()
            .finish();

        assert_eq!(git_with(mock).base_branch().await.unwrap(), "main");
    }

    #[tokio::test]
    async fn test_commit_signed_flag() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("git")
            .with_args(|args| args == ["commit", "-S", "-m", "msg"])
            .returns_success()
            .finish();

        let output = git_with(mock).commit("/repo", "msg", true).await.unwrap();
        assert!(output.success());
    }
}
