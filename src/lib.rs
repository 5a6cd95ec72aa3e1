//! terrakit - review-first infrastructure workflows.
//!
//! Sequences git, terraform and gh into higher-level operator workflows:
//! commit-and-push with upstream reconciliation, plan-review-apply with
//! optional environment fan-out, and pull-request create-or-edit.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod interaction;
pub mod review;
pub mod subprocess;
pub mod terraform;
pub mod workflows;

pub use error::{Error, Result};
