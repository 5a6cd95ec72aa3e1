//! Execution of composed plan pipelines.
//!
//! One task per environment in a JoinSet; every pipeline runs to completion
//! before control returns, and each environment's success or failure is
//! collected individually — a failing environment never aborts siblings.

use std::sync::Arc;
use tokio::task::JoinSet;

use super::compose::EnvironmentPlan;
use crate::subprocess::{ProcessCommandBuilder, ProcessRunner};

#[derive(Debug, Clone)]
pub struct EnvironmentResult {
    pub environment: String,
    pub outcome: Result<(), String>,
}

impl EnvironmentResult {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run each environment's rendered pipeline through `sh -c`, concurrently.
/// Results come back in input order.
pub async fn run_environment_plans(
    runner: Arc<dyn ProcessRunner>,
    plans: Vec<EnvironmentPlan>,
) -> Vec<EnvironmentResult> {
    let mut set = JoinSet::new();

    for (index, plan) in plans.into_iter().enumerate() {
        let runner = Arc::clone(&runner);
        set.spawn(async move {
            let name = plan.environment.name.clone();
            tracing::info!("running plan pipeline for {name}");

            let result = runner
                .run(
                    ProcessCommandBuilder::new("sh")
                        .args(["-c", &plan.rendered])
                        .build(),
                )
                .await;

            let outcome = match result {
                Ok(output) if output.success() => Ok(()),
                Ok(output) => Err(if output.stderr.trim().is_empty() {
                    format!("exited with {:?}", output.status)
                } else {
                    output.stderr.trim().to_string()
                }),
                Err(e) => Err(e.to_string()),
            };

            (
                index,
                EnvironmentResult {
                    environment: name,
                    outcome,
                },
            )
        });
    }

    let mut results: Vec<(usize, EnvironmentResult)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(entry) => results.push(entry),
            Err(e) => tracing::error!("plan task panicked: {e}"),
        }
    }

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;
    use crate::terraform::compose::{ComposePaths, PlanSpec, compose_plan};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn plans_for(envs: &[&str]) -> Vec<EnvironmentPlan> {
        let spec = PlanSpec {
            environments: strings(envs),
            modules: vec![],
            resources: vec![],
            init_first: false,
        };
        let paths = ComposePaths {
            sysconf_dir: "/sysconf".to_string(),
            plan_output_dir: "/does-not-exist-plan-out".to_string(),
        };
        compose_plan(&spec, &paths)
    }

    #[tokio::test]
    async fn test_all_environments_run_and_report() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("sh").returns_success().finish();

        let results =
            run_environment_plans(Arc::new(mock.clone()), plans_for(&["c1-prod", "c9-custom"]))
                .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].environment, "c1-prod");
        assert_eq!(results[1].environment, "c9-custom");
        assert!(results.iter().all(EnvironmentResult::succeeded));
        assert!(mock.verify_called("sh", 2));
    }

    #[tokio::test]
    async fn test_failing_environment_does_not_abort_siblings() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("sh")
            .with_args(|args| args.iter().any(|a| a.contains("c1-prod")))
            .returns_stderr("Error: backend initialization failed")
            .returns_exit_code(1)
            .finish();
        mock.expect_command("sh")
            .with_args(|args| args.iter().any(|a| a.contains("c9-custom")))
            .returns_success()
            .finish();

        let results =
            run_environment_plans(Arc::new(mock), plans_for(&["c1-prod", "c9-custom"])).await;

        assert!(!results[0].succeeded());
        assert!(results[0]
            .outcome
            .as_ref()
            .unwrap_err()
            .contains("backend initialization failed"));
        assert!(results[1].succeeded());
    }
}
