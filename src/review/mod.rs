//! Review platform (GitHub PR) boundary.

pub mod manager;

pub use manager::{build_title, hcl_block, sanitize_subject, PrAction, PullRequestManager};

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::subprocess::{ProcessCommandBuilder, ProcessRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// Fresh snapshot of the branch's pull request; never cached locally.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
    pub state: PrState,
}

#[async_trait]
pub trait GhRunner: Send + Sync {
    /// `gh pr view --json state,title,body,url` for the current branch.
    async fn view_current(&self) -> Result<PullRequestInfo>;

    /// Create a PR; returns its URL. Any content on the error channel is
    /// treated as failure even on a zero exit.
    async fn create(
        &self,
        title: &str,
        base: &str,
        head: &str,
        body: Option<&str>,
    ) -> Result<String>;

    /// Edit the current branch's PR, passing only the changed fields.
    async fn edit(&self, title: Option<&str>, body: Option<&str>) -> Result<String>;
}

pub struct GhRunnerImpl {
    runner: Arc<dyn ProcessRunner>,
}

impl GhRunnerImpl {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl GhRunner for GhRunnerImpl {
    async fn view_current(&self) -> Result<PullRequestInfo> {
        let output = self
            .runner
            .run(
                ProcessCommandBuilder::new("gh")
                    .args(["pr", "view", "--json", "state,title,body,url"])
                    .build(),
            )
            .await?;

        if !output.success() {
            return Err(Error::tool("gh", output.stderr.trim().to_string()));
        }

        Ok(serde_json::from_str(&output.stdout)?)
    }

    async fn create(
        &self,
        title: &str,
        base: &str,
        head: &str,
        body: Option<&str>,
    ) -> Result<String> {
        let mut args = vec![
            "pr", "create", "--title", title, "--base", base, "--head", head,
        ];
        if let Some(body) = body {
            args.push("--body");
            args.push(body);
        }

        let output = self
            .runner
            .run(ProcessCommandBuilder::new("gh").args(&args).build())
            .await?;

        if !output.success() || !output.stderr.trim().is_empty() {
            return Err(Error::tool("gh", output.stderr.trim().to_string()));
        }

        Ok(output.stdout.trim().to_string())
    }

    async fn edit(&self, title: Option<&str>, body: Option<&str>) -> Result<String> {
        let mut args = vec!["pr", "edit"];
        if let Some(title) = title {
            args.push("--title");
            args.push(title);
        }
        if let Some(body) = body {
            args.push("--body");
            args.push(body);
        }

        let output = self
            .runner
            .run(ProcessCommandBuilder::new("gh").args(&args).build())
            .await?;

        if !output.success() || !output.stderr.trim().is_empty() {
            return Err(Error::tool("gh", output.stderr.trim().to_string()));
        }

        Ok(output.stdout.trim().to_string())
    }
}
