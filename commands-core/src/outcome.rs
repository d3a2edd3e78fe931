// commands-core/src/outcome.rs

//! Protocol-agnostic results of the `run_command` tool and prompt.

use crate::errors::{CommandError, Result};
use crate::executor::ExecutionResult;
use crate::format::{format_segments, TextSegment};
use serde::Serialize;

/// Result of one tool invocation. Execution failures are data here, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCallOutcome {
    pub is_error: bool,
    pub segments: Vec<TextSegment>,
}

impl From<&ExecutionResult> for ToolCallOutcome {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            is_error: result.is_failure(),
            segments: format_segments(result),
        }
    }
}

pub const PROMPT_PREAMBLE: &str =
    "I ran the following command, if there is any output it will be shown below:\n";

/// Chat role of a rendered prompt message. Only the user role is produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PromptRole {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptText {
    pub role: PromptRole,
    pub text: String,
}

impl PromptText {
    fn user(text: String) -> Self {
        Self {
            role: PromptRole::User,
            text,
        }
    }
}

/// Renders the messages for the `run_command` prompt.
///
/// Unlike the tool path, a failed command is an error: the caller gets no
/// messages at all.
pub fn prompt_messages(command: &str, result: &ExecutionResult) -> Result<Vec<PromptText>> {
    if let Some(error) = &result.error {
        return Err(CommandError::Execution(error.clone()));
    }

    let mut messages = vec![PromptText::user(format!("{}{}", PROMPT_PREAMBLE, command))];
    if !result.stdout.is_empty() {
        messages.push(PromptText::user(format!("STDOUT:\n{}", result.stdout)));
    }
    if !result.stderr.is_empty() {
        messages.push(PromptText::user(format!("STDERR:\n{}", result.stderr)));
    }
    Ok(messages)
}
