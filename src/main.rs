use clap::Parser;
use tracing::{debug, error};

use terrakit::cli::{Cli, Commands};
use terrakit::workflows::{self, WorkflowContext};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("terrakit started with verbosity level: {}", cli.verbose);

    let ctx = WorkflowContext::production();

    let result = match cli.command {
        Commands::Commit { message, no_sign } => {
            workflows::commit::run(&ctx, &message, !no_sign).await
        }
        Commands::CommitPush { message, no_sign } => {
            workflows::commit_push::run(&ctx, &message, !no_sign).await
        }
        Commands::Switch { child, parent } => {
            workflows::switch::run(&ctx, child.as_deref(), parent.as_deref()).await
        }
        Commands::Pr { body } => workflows::pr::run(&ctx, body.as_deref()).await,
        Commands::Init { directory } => workflows::init::run(&ctx, directory.as_deref()).await,
        Commands::Plan(flags) => workflows::plan::run(&ctx, &flags.into_args()).await,
        Commands::InitPlan(flags) => workflows::init_plan::run(&ctx, &flags.into_args()).await,
        Commands::Apply { directory } => workflows::apply::run(&ctx, directory.as_deref()).await,
    };

    if let Err(e) = result {
        error!("workflow failed: {e}");
        std::process::exit(1);
    }
}
