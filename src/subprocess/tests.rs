use super::*;
use crate::git::GitRunner;
use std::sync::Arc;

#[tokio::test]
async fn test_mock_runner_matches_program_and_args() {
    let mut mock = MockProcessRunner::new();
    mock.expect_command("git")
        .with_args(|args| args == ["status"])
        .returns_stdout("clean")
        .returns_success()
        .finish();

    let runner: Arc<dyn ProcessRunner> = Arc::new(mock.clone());
    let output = runner
        .run(ProcessCommandBuilder::new("git").arg("status").build())
        .await
        .unwrap();

    assert!(output.success());
    assert_eq!(output.stdout, "clean");
    assert!(mock.verify_called("git", 1));
}

#[tokio::test]
async fn test_mock_runner_rejects_unexpected_command() {
    let mock = MockProcessRunner::new();
    let runner: Arc<dyn ProcessRunner> = Arc::new(mock);

    let result = runner
        .run(ProcessCommandBuilder::new("terraform").arg("plan").build())
        .await;

    match result.unwrap_err() {
        ProcessError::MockExpectationNotMet(msg) => assert!(msg.contains("terraform")),
        other => panic!("Expected MockExpectationNotMet, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mock_runner_records_history() {
    let mut mock = MockProcessRunner::new();
    mock.expect_command("git").returns_success().finish();

    let runner: Arc<dyn ProcessRunner> = Arc::new(mock.clone());
    runner
        .run(ProcessCommandBuilder::new("git").args(["pull"]).build())
        .await
        .unwrap();

    let history = mock.get_call_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].args, vec!["pull"]);
}

#[tokio::test]
async fn test_manager_mock_wires_runner() {
    let (subprocess, mut mock) = SubprocessManager::mock();
    mock.expect_command("git")
        .with_args(|args| args == ["rev-parse", "--is-inside-work-tree"])
        .returns_stdout("true\n")
        .returns_success()
        .finish();

    assert!(subprocess.git().is_repo().await);
}

#[test]
fn test_builder_composition() {
    let command = ProcessCommandBuilder::new("terraform")
        .args(["plan", "-out", "crplan"])
        .arg("-no-color")
        .env("TF_IN_AUTOMATION", "1")
        .suppress_stderr()
        .build();

    assert_eq!(command.program, "terraform");
    assert_eq!(command.args, vec!["plan", "-out", "crplan", "-no-color"]);
    assert_eq!(command.env.get("TF_IN_AUTOMATION").unwrap(), "1");
    assert!(command.suppress_stderr);
}
