//! Command-line surface.

use clap::{Parser, Subcommand};

use crate::workflows::PlanArgs;

#[derive(Parser)]
#[command(name = "terrakit")]
#[command(about = "Sequence git, terraform and gh into review-first workflows", long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage everything and create a signed commit
    Commit {
        /// Commit message
        message: String,

        /// Skip commit signing
        #[arg(long)]
        no_sign: bool,
    },
    /// Pull, commit everything, and push (publishing the branch if needed)
    CommitPush {
        /// Commit message
        message: String,

        /// Skip commit signing
        #[arg(long)]
        no_sign: bool,
    },
    /// Check out the parent branch, pull it, and optionally branch off it
    Switch {
        /// Child branch to create (or switch to when it exists)
        child: Option<String>,

        /// Parent branch (default: the remote's HEAD branch)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Create the branch's pull request, or edit the existing one
    Pr {
        /// Pull request body
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Pull the checkout and initialize terraform
    Init {
        /// Environment directory under the sysconf tree
        #[arg(short, long)]
        directory: Option<String>,
    },
    /// Plan, then optionally persist, review, or apply
    Plan(PlanFlags),
    /// Initialize, then plan with the same targeting flags
    InitPlan(PlanFlags),
    /// Apply a previously stored plan
    Apply {
        /// Environment directory under the sysconf tree
        #[arg(short, long)]
        directory: Option<String>,
    },
}

#[derive(Debug, Default, clap::Args)]
pub struct PlanFlags {
    /// Environment directory under the sysconf tree
    #[arg(short, long)]
    pub directory: Option<String>,

    /// Environments to plan concurrently (comma-separated, repeatable)
    #[arg(short, long)]
    pub environments: Vec<String>,

    /// Modules to target (comma-separated, repeatable)
    #[arg(short, long)]
    pub modules: Vec<String>,

    /// Resource addresses to target (comma-separated, repeatable)
    #[arg(short, long)]
    pub resources: Vec<String>,

    /// Write the rendered plan to the configured output directory
    #[arg(short, long)]
    pub output_plan: bool,

    /// Raise a pull request carrying the rendered plan
    #[arg(short = 'p', long)]
    pub create_pr: bool,

    /// Apply the stored plan after confirmation
    #[arg(short, long)]
    pub apply: bool,
}

/// Flatten repeatable comma-separated flag values into single tokens.
/// `-m vpc,dns -m iam` becomes `["vpc", "dns", "iam"]`.
pub fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_string())
        .collect()
}

impl PlanFlags {
    pub fn into_args(self) -> PlanArgs {
        PlanArgs {
            directory: self.directory,
            environments: split_list(&self.environments)
                .into_iter()
                .filter(|e| !e.is_empty())
                .collect(),
            modules: split_list(&self.modules),
            resources: split_list(&self.resources),
            create_review: self.create_pr,
            output_plan: self.output_plan,
            apply: self.apply,
            init_first: false,
        }
    }
}
