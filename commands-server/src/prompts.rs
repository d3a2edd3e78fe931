// commands-server/src/prompts.rs
use commands_core::{
    prompt_messages, CommandError, CommandExecutor, CommandRequest, PromptRole, PromptText,
    COMMAND_ARG,
};
use rmcp::model::{
    GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageContent, PromptMessageRole,
};
use serde_json::{Map, Value};
use tracing::{info, warn};

pub const RUN_COMMAND_PROMPT: &str = "run_command";

pub fn run_command_prompt() -> Prompt {
    Prompt::new(
        RUN_COMMAND_PROMPT,
        Some("Include command output in the prompt. Instead of a tool call, the user decides what commands are relevant."),
        Some(vec![PromptArgument {
            name: COMMAND_ARG.to_string(),
            description: Some("Command to run".to_string()),
            required: Some(true),
        }]),
    )
}

/// Runs the command and renders it as chat messages.
///
/// A failing command is returned as `CommandError::Execution` rather than as
/// message content.
pub async fn run_command(
    executor: &dyn CommandExecutor,
    arguments: Option<&Map<String, Value>>,
) -> Result<Vec<PromptText>, CommandError> {
    let request = CommandRequest::from_arguments(arguments)?;
    info!(command = %request.command, "Running command for prompt");

    let result = executor.execute(&request.command).await;
    prompt_messages(&request.command, &result).inspect_err(|e| {
        warn!(command = %request.command, error = %e, "Prompt command failed");
    })
}

pub fn to_get_prompt_result(messages: Vec<PromptText>) -> GetPromptResult {
    let messages = messages
        .into_iter()
        .map(|message| PromptMessage {
            role: match message.role {
                PromptRole::User => PromptMessageRole::User,
            },
            content: PromptMessageContent::text(message.text),
        })
        .collect();
    GetPromptResult {
        description: None,
        messages,
    }
}
