//! Create-vs-edit decision logic and the interactive PR flows.

use anyhow::Result;

use super::{GhRunner, PrState, PullRequestInfo};
use crate::interaction::{confirm, text_input, UserInteraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrAction {
    Create,
    Edit,
}

/// Strip characters that break shell-quoted PR titles out of a commit
/// subject: dollar signs, quotes and embedded newlines.
pub fn sanitize_subject(subject: &str) -> String {
    subject
        .trim()
        .replace(['$', '\'', '\n'], "")
}

/// PR titles follow the `<branch>: <commit subject>` convention.
pub fn build_title(head: &str, commit_subject: &str) -> String {
    format!("{head}: {}", sanitize_subject(commit_subject))
}

/// Wrap a rendered terraform plan as a fenced HCL block for a PR body.
pub fn hcl_block(text: &str) -> String {
    format!("```hcl\n{text}\n```\n")
}

pub struct PullRequestManager<'a> {
    gh: &'a dyn GhRunner,
    ui: &'a dyn UserInteraction,
}

impl<'a> PullRequestManager<'a> {
    pub fn new(gh: &'a dyn GhRunner, ui: &'a dyn UserInteraction) -> Self {
        Self { gh, ui }
    }

    /// Query the platform for the current branch's PR. A failed query is
    /// indistinguishable from a missing PR by design; the diagnostic is
    /// kept at debug level for operators running with -v.
    pub async fn resolve_state(&self) -> Option<PullRequestInfo> {
        match self.gh.view_current().await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!("pr view failed, treating as no open request: {e}");
                None
            }
        }
    }

    /// A merged request counts as absent: the branch gets a fresh PR.
    pub fn decide(existing: Option<&PullRequestInfo>) -> PrAction {
        match existing {
            Some(info) if info.state != PrState::Merged => PrAction::Edit,
            _ => PrAction::Create,
        }
    }

    pub async fn create(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<String> {
        self.ui.display_progress("Creating Pull Request...");
        let url = self.gh.create(title, base, head, body).await?;
        self.ui.display_success(&url);
        Ok(url)
    }

    /// Interactive edit: collect a possibly-new title (empty keeps the
    /// current one) and, unless the operator keeps the existing body, a new
    /// body — from the `-b` flag when given, otherwise an editor session
    /// with optional HCL wrapping.
    pub async fn edit(
        &self,
        current_title: &str,
        provided_body: Option<&str>,
    ) -> Result<()> {
        let query = format!("Enter title ({current_title}): ");
        let new_title = text_input(self.ui, &query, true).await?;

        let keep_body = confirm(self.ui, "Keep existing PR Body? [y/N]: ", false).await?;

        let new_body = if keep_body {
            None
        } else {
            Some(self.collect_body(provided_body).await?)
        };

        let title_arg = if new_title.is_empty() {
            None
        } else {
            Some(new_title.as_str())
        };

        if title_arg.is_none() && new_body.is_none() {
            self.ui.display_info("Nothing to change");
            return Ok(());
        }

        let url = self.gh.edit(title_arg, new_body.as_deref()).await?;
        if !url.is_empty() {
            self.ui.display_success(&url);
        }
        Ok(())
    }

    async fn collect_body(&self, provided_body: Option<&str>) -> Result<String> {
        if let Some(body) = provided_body {
            if !body.is_empty() {
                return Ok(body.to_string());
            }
        }

        self.ui.display_info("Enter new PR body");
        let mut body = self.ui.edit_text().await?;

        if confirm(self.ui, "Format as Terraform body? [y/N]: ", false).await? {
            body = hcl_block(&body);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::mocks::MockUserInteraction;
    use crate::review::GhRunnerImpl;
    use crate::subprocess::MockProcessRunner;
    use std::sync::Arc;

    fn open_pr() -> PullRequestInfo {
        PullRequestInfo {
            title: "topic: change".to_string(),
            body: "old body".to_string(),
            url: "https://example.com/pr/1".to_string(),
            state: PrState::Open,
        }
    }

    #[test]
    fn test_decide_create_when_absent() {
        assert_eq!(PullRequestManager::decide(None), PrAction::Create);
    }

    #[test]
    fn test_decide_create_when_merged() {
        let mut info = open_pr();
        info.state = PrState::Merged;
        assert_eq!(PullRequestManager::decide(Some(&info)), PrAction::Create);
    }

    #[test]
    fn test_decide_edit_for_open_and_closed() {
        assert_eq!(PullRequestManager::decide(Some(&open_pr())), PrAction::Edit);

        let mut closed = open_pr();
        closed.state = PrState::Closed;
        assert_eq!(PullRequestManager::decide(Some(&closed)), PrAction::Edit);
    }

    #[test]
    fn test_sanitize_subject() {
        assert_eq!(sanitize_subject(" add $cards 'quoted'\n"), "add cards quoted");
    }

    #[test]
    fn test_build_title() {
        assert_eq!(build_title("topic", "add cards"), "topic: add cards");
    }

    #[test]
    fn test_hcl_block_wrapping() {
        assert_eq!(hcl_block("plan text"), "```hcl\nplan text\n```\n");
    }

    #[tokio::test]
    async fn test_resolve_state_folds_query_failure_to_none() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("gh")
            .returns_stderr("no pull requests found")
            .returns_exit_code(1)
            .finish();
        let gh = GhRunnerImpl::new(Arc::new(mock));
        let ui = MockUserInteraction::new();

        let manager = PullRequestManager::new(&gh, &ui);
        assert!(manager.resolve_state().await.is_none());
    }

    #[tokio::test]
    async fn test_edit_keeps_body_and_title() {
        let mock = MockProcessRunner::new();
        let gh = GhRunnerImpl::new(Arc::new(mock.clone()));
        let ui = MockUserInteraction::new();
        ui.add_line(""); // keep title
        ui.add_line("y"); // keep body

        let manager = PullRequestManager::new(&gh, &ui);
        manager.edit("topic: change", None).await.unwrap();

        // Nothing changed, so gh pr edit is never invoked.
        assert!(mock.verify_called("gh", 0));
    }

    #[tokio::test]
    async fn test_edit_collects_body_from_editor_with_hcl_wrap() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("gh")
            .with_args(|args| {
                args == ["pr", "edit", "--body", "```hcl\nresource {}\n```\n"]
            })
            .returns_stdout("https://example.com/pr/1")
            .returns_success()
            .finish();
        let gh = GhRunnerImpl::new(Arc::new(mock));
        let ui = MockUserInteraction::new();
        ui.add_line(""); // keep title
        ui.add_line("n"); // replace body
        ui.set_edited_text("resource {}");
        ui.add_line("y"); // wrap as hcl

        let manager = PullRequestManager::new(&gh, &ui);
        manager.edit("topic: change", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_uses_provided_body() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("gh")
            .with_args(|args| {
                args == ["pr", "edit", "--title", "new title", "--body", "given body"]
            })
            .returns_stdout("https://example.com/pr/1")
            .returns_success()
            .finish();
        let gh = GhRunnerImpl::new(Arc::new(mock));
        let ui = MockUserInteraction::new();
        ui.add_line("new title");
        ui.add_line("n"); // replace body

        let manager = PullRequestManager::new(&gh, &ui);
        manager.edit("topic: change", Some("given body")).await.unwrap();
    }
}
