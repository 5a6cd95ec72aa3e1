use thiserror::Error;

use crate::subprocess::ProcessError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not inside a git repository")]
    NotInRepo,

    #[error("configuration conflict: {0}")]
    ConfigConflict(String),

    #[error("directory {directory} does not exist in {sysconf_dir}")]
    MissingDirectory {
        directory: String,
        sysconf_dir: String,
    },

    #[error("Protected branch update failed. Changes must be made through a pull request")]
    ProtectedBranch,

    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("editor closed with non-zero exit code")]
    EditorExit,

    #[error("{tool} failed: {diagnostic}")]
    Tool { tool: String, diagnostic: String },

    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap an external tool's diagnostic text.
    pub fn tool(tool: &str, diagnostic: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.to_string(),
            diagnostic: diagnostic.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_carries_diagnostic() {
        let err = Error::tool("terraform", "Error: invalid backend");
        assert_eq!(
            err.to_string(),
            "terraform failed: Error: invalid backend"
        );
    }

    #[test]
    fn protected_branch_message_is_verbatim() {
        assert_eq!(
            Error::ProtectedBranch.to_string(),
            "Protected branch update failed. Changes must be made through a pull request"
        );
    }
}
