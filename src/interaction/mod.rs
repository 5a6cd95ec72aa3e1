//! User interaction handling.
//!
//! A single injectable seam for everything that reads the operator's
//! terminal: line-based answers, message display, and the external editor
//! session. Tests script answers through the mock instead of stdin.

pub mod display;
pub mod editor;
pub mod prompts;

pub use display::{ProgressDisplay, ProgressDisplayImpl};
pub use prompts::{confirm, text_input};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::subprocess::ProcessRunner;

/// Trait for user interaction. `read_line` is deliberately raw — the
/// validation loops in [`prompts`] sit on top of it, so scripted test
/// answers exercise the re-prompt logic itself.
#[async_trait]
pub trait UserInteraction: Send + Sync {
    /// Print a prompt and read one trimmed line of input.
    async fn read_line(&self, prompt: &str) -> Result<String>;

    /// Compose a multi-line text in the operator's editor.
    async fn edit_text(&self) -> Result<String>;

    fn display_info(&self, message: &str);
    fn display_warning(&self, message: &str);
    fn display_error(&self, message: &str);
    fn display_progress(&self, message: &str);
    fn display_success(&self, message: &str);
}

/// Default implementation backed by stdin and `$EDITOR`.
pub struct DefaultUserInteraction {
    display: ProgressDisplayImpl,
    runner: Arc<dyn ProcessRunner>,
}

impl DefaultUserInteraction {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            display: ProgressDisplayImpl::new(),
            runner,
        }
    }
}

#[async_trait]
impl UserInteraction for DefaultUserInteraction {
    async fn read_line(&self, prompt: &str) -> Result<String> {
        use std::io::Write;

        print!("{prompt}");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    async fn edit_text(&self) -> Result<String> {
        editor::edit_large_text(self.runner.as_ref()).await
    }

    fn display_info(&self, message: &str) {
        self.display.info(message);
    }

    fn display_warning(&self, message: &str) {
        self.display.warning(message);
    }

    fn display_error(&self, message: &str) {
        self.display.error(message);
    }

    fn display_progress(&self, message: &str) {
        self.display.progress(message);
    }

    fn display_success(&self, message: &str) {
        self.display.success(message);
    }
}

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub struct MockUserInteraction {
        pub line_responses: Mutex<VecDeque<String>>,
        pub edited_text: Mutex<Option<String>>,
        pub messages: Mutex<Vec<String>>,
    }

    impl Default for MockUserInteraction {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockUserInteraction {
        pub fn new() -> Self {
            Self {
                line_responses: Mutex::new(VecDeque::new()),
                edited_text: Mutex::new(None),
                messages: Mutex::new(Vec::new()),
            }
        }

        pub fn add_line(&self, response: &str) {
            self.line_responses
                .lock()
                .unwrap()
                .push_back(response.to_string());
        }

        pub fn set_edited_text(&self, text: &str) {
            *self.edited_text.lock().unwrap() = Some(text.to_string());
        }

        pub fn get_messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserInteraction for MockUserInteraction {
        async fn read_line(&self, prompt: &str) -> Result<String> {
            self.messages
                .lock()
                .unwrap()
                .push(format!("PROMPT: {prompt}"));
            self.line_responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("No mock response configured"))
        }

        async fn edit_text(&self) -> Result<String> {
            self.edited_text
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow::anyhow!("No mock editor text configured"))
        }

        fn display_info(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("INFO: {message}"));
        }

        fn display_warning(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("WARN: {message}"));
        }

        fn display_error(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("ERROR: {message}"));
        }

        fn display_progress(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("PROGRESS: {message}"));
        }

        fn display_success(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("SUCCESS: {message}"));
        }
    }
}
