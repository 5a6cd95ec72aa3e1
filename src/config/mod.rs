//! Operator-scoped configuration.
//!
//! Values come from `$HOME/.terrakit.cfg`, a line-oriented `key=value`
//! file; anything missing is prompted for once and held for the rest of
//! the run. The resolved snapshot lives in the workflow context — there is
//! no process-global state and the file is never written back.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::interaction::{text_input, UserInteraction};

pub const CONFIG_FILE_NAME: &str = ".terrakit.cfg";

const SYSCONF_KEY: &str = "sysconf_directory";
const PLAN_OUTPUT_KEY: &str = "plan_output_directory";

const SYSCONF_QUERY: &str = "please enter full path to sysconf directory: ";
const PLAN_OUTPUT_QUERY: &str = "Please enter the full path to the output plan directory: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    Sysconf,
    PlanOutput,
}

impl DirectoryKind {
    fn key(&self) -> &'static str {
        match self {
            DirectoryKind::Sysconf => SYSCONF_KEY,
            DirectoryKind::PlanOutput => PLAN_OUTPUT_KEY,
        }
    }

    fn query(&self) -> &'static str {
        match self {
            DirectoryKind::Sysconf => SYSCONF_QUERY,
            DirectoryKind::PlanOutput => PLAN_OUTPUT_QUERY,
        }
    }
}

/// Per-run configuration snapshot. File-backed values win; prompted values
/// fill the gaps and are memoized for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub sysconf_dir: Option<String>,
    pub plan_output_dir: Option<String>,
}

impl ResolvedConfig {
    fn get(&self, kind: DirectoryKind) -> Option<&String> {
        match kind {
            DirectoryKind::Sysconf => self.sysconf_dir.as_ref(),
            DirectoryKind::PlanOutput => self.plan_output_dir.as_ref(),
        }
    }

    fn set(&mut self, kind: DirectoryKind, value: String) {
        match kind {
            DirectoryKind::Sysconf => self.sysconf_dir = Some(value),
            DirectoryKind::PlanOutput => self.plan_output_dir = Some(value),
        }
    }
}

/// Parse the line-oriented `key=value` format. Lines without `=` are
/// ignored; keys and values are trimmed.
pub fn parse_config(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                values.insert(key.to_string(), value.to_string());
            }
        }
    }

    values
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Read the config file when present. Absence is not an error.
pub fn load_file() -> ResolvedConfig {
    let Some(path) = config_path() else {
        return ResolvedConfig::default();
    };

    let Ok(content) = std::fs::read_to_string(&path) else {
        tracing::debug!("no config file at {}", path.display());
        return ResolvedConfig::default();
    };

    let values = parse_config(&content);
    ResolvedConfig {
        sysconf_dir: values.get(SYSCONF_KEY).cloned(),
        plan_output_dir: values.get(PLAN_OUTPUT_KEY).cloned(),
    }
}

pub struct ConfigResolver {
    resolved: Mutex<ResolvedConfig>,
}

impl ConfigResolver {
    pub fn new(initial: ResolvedConfig) -> Self {
        Self {
            resolved: Mutex::new(initial),
        }
    }

    pub fn from_file() -> Self {
        Self::new(load_file())
    }

    /// Resolve a directory, prompting (and re-prompting until non-empty)
    /// when neither the file nor an earlier prompt supplied it. The answer
    /// is memoized and never re-read from disk mid-run.
    pub async fn resolve(
        &self,
        kind: DirectoryKind,
        ui: &dyn UserInteraction,
    ) -> Result<String> {
        if let Some(value) = self.resolved.lock().unwrap().get(kind) {
            return Ok(value.clone());
        }

        let value = text_input(ui, kind.query(), false).await?;
        self.resolved.lock().unwrap().set(kind, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::mocks::MockUserInteraction;

    #[test]
    fn test_parse_config_key_value_lines() {
        let content = "sysconf_directory = /home/op/sysconf\n\
                       plan_output_directory=/tmp/plans\n\
                       a comment line without equals\n\
                       = missing key\n";
        let values = parse_config(content);
        assert_eq!(values.get("sysconf_directory").unwrap(), "/home/op/sysconf");
        assert_eq!(values.get("plan_output_directory").unwrap(), "/tmp/plans");
        assert_eq!(values.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_prefers_file_value() {
        let resolver = ConfigResolver::new(ResolvedConfig {
            sysconf_dir: Some("/from/file".to_string()),
            plan_output_dir: None,
        });
        let ui = MockUserInteraction::new();

        let value = resolver
            .resolve(DirectoryKind::Sysconf, &ui)
            .await
            .unwrap();
        assert_eq!(value, "/from/file");
        assert!(ui.get_messages().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_prompts_until_non_empty_and_memoizes() {
        let resolver = ConfigResolver::new(ResolvedConfig::default());
        let ui = MockUserInteraction::new();
        ui.add_line("");
        ui.add_line("/prompted/path");

        let first = resolver
            .resolve(DirectoryKind::PlanOutput, &ui)
            .await
            .unwrap();
        assert_eq!(first, "/prompted/path");

        // Second resolution hits the memo; no further prompts are issued.
        let second = resolver
            .resolve(DirectoryKind::PlanOutput, &ui)
            .await
            .unwrap();
        assert_eq!(second, "/prompted/path");
        assert_eq!(
            ui.get_messages()
                .iter()
                .filter(|m| m.starts_with("PROMPT"))
                .count(),
            2
        );
    }
}
