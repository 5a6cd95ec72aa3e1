//! External editor session for multi-line input.
//!
//! Writes a temp file, hands the terminal to `$EDITOR` (fallback `nano`),
//! and reads the saved buffer back. A non-zero editor exit is fatal for the
//! caller's edit path.

use anyhow::Result;

use crate::error::Error;
use crate::subprocess::{ProcessCommandBuilder, ProcessRunner};

pub async fn edit_large_text(runner: &dyn ProcessRunner) -> Result<String> {
    let path = std::env::temp_dir().join("terrakit-pr-body.txt");
    let path_str = path.to_string_lossy().to_string();

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());

    let status = runner
        .run_interactive(ProcessCommandBuilder::new(&editor).arg(&path_str).build())
        .await
        .map_err(Error::Process)?;

    if !status.success() {
        return Err(Error::EditorExit.into());
    }

    let content = tokio::fs::read_to_string(&path).await?;
    let _ = tokio::fs::remove_file(&path).await;

    Ok(content)
}
