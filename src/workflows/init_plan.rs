//! Init-then-plan: a plan run with one-time initialization in front.

use crate::error::Result;

use super::{plan, PlanArgs, WorkflowContext};

/// Delegate to the plan workflow with initialization forced on: the scoped
/// path runs `terraform init` before planning, the environment fan-out
/// prepends the backend-config init step to each pipeline.
pub async fn run(ctx: &WorkflowContext, args: &PlanArgs) -> Result<()> {
    let mut args = args.clone();
    args.init_first = true;
    plan::run(ctx, &args).await
}
