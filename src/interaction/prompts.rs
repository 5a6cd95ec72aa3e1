//! Validated prompt protocol.
//!
//! Both prompts loop until a structurally valid answer arrives; there is no
//! retry bound and no timeout. They are the only gates in front of
//! destructive operations.

use anyhow::Result;

use super::UserInteraction;

/// Yes/no confirmation. The answer is trimmed and lowercased; an empty
/// answer takes the default; anything outside y/n re-prompts.
pub async fn confirm(
    ui: &dyn UserInteraction,
    query: &str,
    default_yes: bool,
) -> Result<bool> {
    loop {
        let answer = ui.read_line(query).await?;
        let answer = answer.trim().to_lowercase();

        if answer.is_empty() {
            return Ok(default_yes);
        }

        match answer.as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

/// Free-text input, re-prompting until non-empty unless `allow_empty`.
pub async fn text_input(
    ui: &dyn UserInteraction,
    query: &str,
    allow_empty: bool,
) -> Result<String> {
    loop {
        let answer = ui.read_line(query).await?;
        let answer = answer.trim().to_string();

        if allow_empty || !answer.is_empty() {
            return Ok(answer);
        }
    }
}
