// commands-server/src/tools.rs
use commands_core::{CommandError, CommandExecutor, CommandRequest, ToolCallOutcome, COMMAND_ARG};
use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, trace, warn};

pub const RUN_COMMAND_TOOL: &str = "run_command";

fn create_schema_object(
    properties: Vec<(&str, Value)>,
    required: Vec<&str>,
) -> Arc<Map<String, Value>> {
    let props_map: Map<String, Value> = properties
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let req_vec: Vec<Value> = required
        .into_iter()
        .map(|s| Value::String(s.to_string()))
        .collect();

    let schema = json!({
        "type": "object",
        "properties": props_map,
        "required": req_vec
    });
    let map = match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Arc::new(map)
}

pub fn run_command_tool() -> Tool {
    let schema = create_schema_object(
        vec![(
            COMMAND_ARG,
            json!({ "type": "string", "description": "Command to run" }),
        )],
        vec![COMMAND_ARG],
    );
    Tool::new(
        RUN_COMMAND_TOOL,
        "Run a shell command and return its output",
        schema,
    )
}

/// Decodes the arguments and runs the command once.
///
/// A command that fails is still `Ok`, flagged through `is_error`. Only a bad
/// `command` argument is an `Err`, and then nothing is spawned.
pub async fn run_command(
    executor: &dyn CommandExecutor,
    arguments: Option<&Map<String, Value>>,
) -> Result<ToolCallOutcome, CommandError> {
    let request = CommandRequest::from_arguments(arguments)?;
    info!(command = %request.command, "Running command for tool call");

    let result = executor.execute(&request.command).await;
    let outcome = ToolCallOutcome::from(&result);
    if outcome.is_error {
        warn!(command = %request.command, error = ?result.error, "Command reported failure");
    }
    trace!(
        outcome = %serde_json::to_string_pretty(&outcome).unwrap_or_else(|e| format!("Serialization error: {}", e)),
        "Tool outcome for '{}'",
        request.command
    );
    Ok(outcome)
}

/// Maps segments to text content. The segment label has no field on the wire.
pub fn to_call_tool_result(outcome: ToolCallOutcome) -> CallToolResult {
    let content: Vec<Content> = outcome
        .segments
        .into_iter()
        .map(|segment| Content::text(segment.text))
        .collect();
    if outcome.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands_core::{SegmentLabel, ShellExecutor, TextSegment};

    fn command_args(command: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(COMMAND_ARG.to_string(), Value::String(command.to_string()));
        map
    }

    fn wire(result: &CallToolResult) -> Value {
        serde_json::to_value(result).unwrap()
    }

    #[test]
    fn test_schema_requires_command() {
        let tool = run_command_tool();
        assert_eq!(tool.name, RUN_COMMAND_TOOL);
        let schema = Value::Object((*tool.input_schema).clone());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["command"]["type"], "string");
        assert_eq!(schema["required"], json!(["command"]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_hi() {
        let executor = ShellExecutor::default();
        let args = command_args("echo hi");
        let outcome = run_command(&executor, Some(&args)).await.unwrap();
        assert!(!outcome.is_error);
        assert_eq!(
            outcome.segments,
            vec![TextSegment::new(SegmentLabel::Stdout, "hi\n")]
        );

        let result = wire(&to_call_tool_result(outcome));
        assert_eq!(result["isError"], false);
        let content = result["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "hi\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_one_is_error_content() {
        let executor = ShellExecutor::default();
        let args = command_args("exit 1");
        let outcome = run_command(&executor, Some(&args)).await.unwrap();
        assert!(outcome.is_error);
        assert_eq!(outcome.segments.len(), 1);
        assert_eq!(outcome.segments[0].label, SegmentLabel::Error);
        assert!(!outcome.segments[0].text.is_empty());

        let result = wire(&to_call_tool_result(outcome));
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["type"], "text");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_precedes_streams() {
        let executor = ShellExecutor::default();
        let args = command_args("echo out; echo err >&2; false");
        let outcome = run_command(&executor, Some(&args)).await.unwrap();
        let labels: Vec<_> = outcome.segments.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![SegmentLabel::Error, SegmentLabel::Stdout, SegmentLabel::Stderr]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pure_command_is_repeatable() {
        let executor = ShellExecutor::default();
        let args = command_args("echo hello");
        let first = run_command(&executor, Some(&args)).await.unwrap();
        let second = run_command(&executor, Some(&args)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let executor = ShellExecutor::default();
        let args = command_args("");
        let err = run_command(&executor, Some(&args)).await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(_)));

        let err = run_command(&executor, None).await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(_)));
    }
}
