//! Branch switching: sync the parent, then branch off it.

use crate::error::{Error, Result};
use crate::git::GitRunner;

use super::WorkflowContext;

/// Check out the parent branch (the remote's default when none is given),
/// pull it up to date, and optionally create a child branch from it. If
/// the child already exists locally the create falls back to a plain
/// checkout with a warning.
pub async fn run(
    ctx: &WorkflowContext,
    child: Option<&str>,
    parent: Option<&str>,
) -> Result<()> {
    super::require_repo(ctx).await?;

    let git = ctx.subprocess.git();
    let parent = match parent {
        Some(p) => p.to_string(),
        None => git.default_branch().await?,
    };
    ctx.ui.display_info(&format!("parent branch: {parent}"));

    let checked_out = git.checkout(&parent).await?;
    if !checked_out.success() {
        return Err(Error::tool("git", checked_out.stderr.trim()));
    }

    let pulled = git.pull().await?;
    if !pulled.success() {
        return Err(Error::tool("git", pulled.stderr.trim()));
    }

    if let Some(child) = child {
        let created = git.checkout_new(child).await?;
        if !created.success() {
            ctx.ui
                .display_warning(&format!("branch {child} already exists, switching to it"));
            let switched = git.checkout(child).await?;
            if !switched.success() {
                return Err(Error::tool("git", switched.stderr.trim()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::subprocess::MockProcessRunner;
    use crate::workflows::test_support::mock_context;

    fn expect_parent_sync(runner: &mut MockProcessRunner) {
        runner
            .expect_command("git")
            .with_args(|args| args == ["rev-parse", "--is-inside-work-tree"])
            .returns_success()
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["checkout", "main"])
            .returns_success()
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["pull"])
            .returns_success()
            .finish();
    }

    #[tokio::test]
    async fn test_switch_resolves_default_parent() {
        let (ctx, mut runner, _ui) = mock_context(ResolvedConfig::default());
        expect_parent_sync(&mut runner);
        runner
            .expect_command("git")
            .with_args(|args| args == ["remote", "show", "origin"])
            .returns_stdout("* remote origin\n  HEAD branch: main\n")
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["checkout", "-b", "feature-x"])
            .returns_success()
            .finish();

        run(&ctx, Some("feature-x"), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_existing_child_falls_back_to_checkout() {
        let (ctx, mut runner, ui) = mock_context(ResolvedConfig::default());
        expect_parent_sync(&mut runner);
        runner
            .expect_command("git")
            .with_args(|args| args == ["checkout", "-b", "feature-x"])
            .returns_exit_code(128)
            .returns_stderr("fatal: a branch named 'feature-x' already exists\n")
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["checkout", "feature-x"])
            .returns_success()
            .finish();

        run(&ctx, Some("feature-x"), Some("main")).await.unwrap();
        assert!(ui
            .get_messages()
            .iter()
            .any(|m| m.contains("already exists")));
    }

    #[tokio::test]
    async fn test_parent_only_sync() {
        let (ctx, mut runner, _ui) = mock_context(ResolvedConfig::default());
        expect_parent_sync(&mut runner);

        run(&ctx, None, Some("main")).await.unwrap();
        assert!(!runner
            .get_call_history()
            .iter()
            .any(|cmd| cmd.args.contains(&"-b".to_string())));
    }
}
