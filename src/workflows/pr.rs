//! Create-or-edit the branch's pull request.

use crate::error::Result;
use crate::git::{BranchReconciler, GitRunner, ReconcileOutcome};
use crate::interaction::confirm;
use crate::review::{build_title, PrAction, PullRequestManager};

use super::WorkflowContext;

/// Ensure the branch is published, then either open a new PR titled
/// `<branch>: <latest commit subject>` against the detected base, or —
/// when one already exists and is not merged — offer to edit it.
pub async fn run(ctx: &WorkflowContext, body: Option<&str>) -> Result<()> {
    super::require_repo(ctx).await?;

    let git = ctx.subprocess.git();
    let head = git.current_branch().await?;
    let base = git.base_branch().await?;
    ctx.ui.display_info(&format!("parent branch: {base}"));

    let reconciler = BranchReconciler::new(&git);
    if let ReconcileOutcome::Unknown(diagnostic) =
        reconciler.ensure_upstream(&head, false).await?
    {
        ctx.ui.display_warning(&diagnostic);
    }

    let subject = git.latest_commit_message().await?;
    let title = build_title(&head, &subject);

    let gh = ctx.subprocess.gh();
    let manager = PullRequestManager::new(&gh, ctx.ui.as_ref());
    let existing = manager.resolve_state().await;

    match (PullRequestManager::decide(existing.as_ref()), existing) {
        (PrAction::Edit, Some(info)) => {
            ctx.ui
                .display_info(&format!("Pull request exists already:\n{}", info.url));
            if confirm(ctx.ui.as_ref(), "Edit pull request? [Y/n]: ", true).await? {
                manager.edit(&info.title, body).await?;
            }
        }
        _ => {
            manager.create(&base, &head, &title, body).await?;
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

    fn expect_published_branch(runner: &mut MockProcessRunner) {
        runner
            .expect_command("git")
            .with_args(|args| args == ["rev-parse", "--is-inside-work-tree"])
            .returns_success()
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["symbolic-ref", "--short", "HEAD"])
            .returns_stdout("topic\n")
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["log", "--pretty=format:%D", "HEAD^"])
            .returns_stdout("origin/main, main\n")
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args.first().map(String::as_str) == Some("ls-remote"))
            .returns_stdout("abc123\trefs/heads/topic\n")
            .finish();
        runner
            .expect_command("git")
            .with_args(|args| args == ["log", "-1", "--pretty=%B"])
            .returns_stdout("add $vpc module\n\nlong body\n")
            .finish();
    }

    #[tokio::test]
    async fn test_creates_pr_with_sanitized_title() {
        let (ctx, mut runner, _ui) = mock_context(ResolvedConfig::default());
        expect_published_branch(&mut runner);
        runner
            .expect_command("gh")
            .with_args(|args| args.first().map(String::as_str) == Some("pr")
                && args.get(1).map(String::as_str) == Some("view"))
            .returns_exit_code(1)
            .returns_stderr("no pull requests found for branch \"topic\"\n")
            .finish();
        runner
            .expect_command("gh")
            .with_args(|args| {
                args.get(1).map(String::as_str) == Some("create")
                    && args.contains(&"topic: add vpc module".to_string())
                    && args.contains(&"--base".to_string())
                    && args.contains(&"main".to_string())
            })
            .returns_stdout("https://example.com/pr/7\n")
            .finish();

        run(&ctx, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_declining_edit_leaves_pr_untouched() {
        let (ctx, mut runner, ui) = mock_context(ResolvedConfig::default());
        expect_published_branch(&mut runner);
        runner
            .expect_command("gh")
            .with_args(|args| args.get(1).map(String::as_str) == Some("view"))
            .returns_stdout(
                r#"{"state":"OPEN","title":"topic: old","body":"b","url":"https://example.com/pr/7"}"#,
            )
            .finish();
        ui.add_line("n");

        run(&ctx, None).await.unwrap();
        assert!(ui
            .get_messages()
            .iter()
            .any(|m| m.contains("Pull request exists already")));
        assert!(!runner
            .get_call_history()
            .iter()
            .any(|cmd| cmd.args.get(1).map(String::as_str) == Some("edit")));
    }
}
