//! Plan, review, act: the central terraform workflow.
//!
//! A plan run either targets one directory (scoped by `-d` or the current
//! directory) or fans out over `-e` environments, one concurrent pipeline
//! per environment. The single-directory path can additionally persist the
//! rendered plan, raise a pull request carrying it, or apply it after an
//! explicit confirmation — but never review and apply in the same run.

use std::path::{Path, PathBuf};

use crate::config::DirectoryKind;
use crate::error::{Error, Result};
use crate::interaction::{confirm, text_input};
use crate::review::hcl_block;
use crate::terraform::{
    compose_plan, compose_single, run_environment_plans, ComposePaths, PlanSpec, TerraformRunner,
};

use super::WorkflowContext;

/// File name for a persisted rendered plan, under `<output>/<env>/`.
pub const PLAN_FILE_NAME: &str = "terrakit-crplan.txt";

#[derive(Debug, Clone, Default)]
pub struct PlanArgs {
    pub directory: Option<String>,
    pub environments: Vec<String>,
    pub modules: Vec<String>,
    pub resources: Vec<String>,
    pub create_review: bool,
    pub output_plan: bool,
    pub apply: bool,
    pub init_first: bool,
}

pub async fn run(ctx: &WorkflowContext, args: &PlanArgs) -> Result<()> {
    if args.create_review && args.apply {
        return Err(Error::ConfigConflict(
            "a plan cannot be sent for review and applied in the same run".to_string(),
        ));
    }

    if !args.environments.is_empty() {
        if args.create_review || args.apply {
            return Err(Error::ConfigConflict(
                "environment fan-out only writes plan files; review and apply are per-directory"
                    .to_string(),
            ));
        }
        return run_batched(ctx, args).await;
    }

    run_scoped(ctx, args).await
}

/// One pipeline per environment, run concurrently; each environment's
/// outcome is reported individually and any failure fails the run after
/// every sibling has finished.
async fn run_batched(ctx: &WorkflowContext, args: &PlanArgs) -> Result<()> {
    let ui = ctx.ui.as_ref();
    let paths = ComposePaths {
        sysconf_dir: ctx.config.resolve(DirectoryKind::Sysconf, ui).await?,
        plan_output_dir: ctx.config.resolve(DirectoryKind::PlanOutput, ui).await?,
    };
    let spec = PlanSpec {
        environments: args.environments.clone(),
        modules: args.modules.clone(),
        resources: args.resources.clone(),
        init_first: args.init_first,
    };

    let plans = compose_plan(&spec, &paths);
    for plan in &plans {
        tracing::debug!(
            "composed pipeline for {}: {}",
            plan.environment.name,
            plan.rendered
        );
    }

    let results = run_environment_plans(ctx.subprocess.runner(), plans).await;
    let mut failed = Vec::new();
    for result in &results {
        match &result.outcome {
            Ok(()) => ctx
                .ui
                .display_success(&format!("plan written for {}", result.environment)),
            Err(diagnostic) => {
                ctx.ui
                    .display_error(&format!("{}: {diagnostic}", result.environment));
                failed.push(result.environment.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::tool(
            "terraform",
            format!("plan failed in {}", failed.join(", ")),
        ))
    }
}

async fn run_scoped(ctx: &WorkflowContext, args: &PlanArgs) -> Result<()> {
    let dir = super::working_dir(ctx, args.directory.as_deref()).await?;
    let tf = ctx.subprocess.terraform();

    if args.init_first {
        ctx.ui
            .display_progress(&format!("Initializing terraform in {}", dir.display()));
        let initialized = tf.init(&dir).await?;
        if !initialized.success() {
            return Err(Error::tool("terraform", initialized.stderr.trim()));
        }
    }

    let no_color = args.create_review || args.output_plan;
    let command = compose_single(&args.modules, &args.resources, no_color);
    ctx.ui.display_info(&format!("$ {command}"));

    let planned = tf.run_shell(&dir, &command).await?;
    if !planned.success() {
        let diagnostic = if planned.stderr.trim().is_empty() {
            planned.stdout.trim()
        } else {
            planned.stderr.trim()
        };
        return Err(Error::tool("terraform", diagnostic));
    }

    // The rendered text goes to the terminal, a file, or a PR body; it is
    // always produced without color codes.
    let shown = tf.show(&dir, true).await?;
    if !shown.success() {
        return Err(Error::tool("terraform", shown.stderr.trim()));
    }
    let rendered = shown.stdout;
    ctx.ui.display_info(&rendered);

    if args.output_plan {
        let path = persist_plan(ctx, args.directory.as_deref(), &rendered).await?;
        ctx.ui
            .display_success(&format!("plan written to {}", path.display()));
    }

    if args.create_review {
        create_review(ctx, &rendered).await?;
    }

    if args.apply {
        let query = format!("Apply terraform in {}? [y/N]: ", dir.display());
        if confirm(ctx.ui.as_ref(), &query, false).await? {
            super::apply::run(ctx, args.directory.as_deref()).await?;
        }
    }

    Ok(())
}

/// Write the rendered plan under `<output>/<env>/terrakit-crplan.txt`,
/// where `<env>` is the scoped directory name or `none`.
async fn persist_plan(
    ctx: &WorkflowContext,
    directory: Option<&str>,
    rendered: &str,
) -> Result<PathBuf> {
    let output_dir = ctx
        .config
        .resolve(DirectoryKind::PlanOutput, ctx.ui.as_ref())
        .await?;
    let env = directory
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("none");

    let target_dir = Path::new(&output_dir).join(env);
    std::fs::create_dir_all(&target_dir)?;
    let path = target_dir.join(PLAN_FILE_NAME);
    std::fs::write(&path, rendered)?;
    Ok(path)
}

/// Offer a commit (pushed with upstream reconciliation), then raise a PR
/// whose body carries the rendered plan as a fenced HCL block. Declining
/// the commit skips the review entirely; nothing is pushed or published.
async fn create_review(ctx: &WorkflowContext, rendered: &str) -> Result<()> {
    let ui = ctx.ui.as_ref();
    if confirm(ui, "Create commit? [Y/n]: ", true).await? {
        let message = text_input(ui, "Enter commit message: ", false).await?;
        super::commit_push::run(ctx, &message, true).await?;

        let body = hcl_block(rendered);
        super::pr::run(ctx, Some(&body)).await?;
    }

    Ok(())
}
