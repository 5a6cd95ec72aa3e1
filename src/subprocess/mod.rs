//! Unified subprocess abstraction layer.
//!
//! Every external tool (git, terraform, gh, the editor) is reached through
//! the [`ProcessRunner`] trait so workflows can be exercised against a mock
//! runner without touching real repositories or cloud state.

pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;

#[cfg(test)]
mod tests;

pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner};

use std::sync::Arc;

#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(TokioProcessRunner))
    }

    pub fn mock() -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        let runner = Arc::new(mock.clone()) as Arc<dyn ProcessRunner>;
        (Self::new(runner), mock)
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    pub fn git(&self) -> crate::git::GitRunnerImpl {
        crate::git::GitRunnerImpl::new(Arc::clone(&self.runner))
    }

    pub fn terraform(&self) -> crate::terraform::TerraformRunnerImpl {
        crate::terraform::TerraformRunnerImpl::new(Arc::clone(&self.runner))
    }

    pub fn gh(&self) -> crate::review::GhRunnerImpl {
        crate::review::GhRunnerImpl::new(Arc::clone(&self.runner))
    }
}
