// commands-server/src/server.rs
use crate::{prompts, tools};
use commands_core::{CommandError, CommandExecutor};
use rmcp::{
    RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ErrorData as McpError, GetPromptRequestParam,
        GetPromptResult, Implementation, ListPromptsResult, ListToolsResult,
        PaginatedRequestParam, Prompt, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const SERVER_NAME: &str = "mcp-server-commands";

/// Protocol-facing error for a core failure. Request-shape problems become
/// invalid params; a failed command becomes an internal error.
pub fn mcp_error(err: CommandError) -> McpError {
    if err.is_invalid_request() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

/// Server context built once at startup and handed to the transport.
#[derive(Clone)]
pub struct CommandServer {
    executor: Arc<dyn CommandExecutor>,
    tools: Arc<HashMap<String, Tool>>,
    prompts: Arc<HashMap<String, Prompt>>,
}

impl CommandServer {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        let mut tools = HashMap::new();
        tools.insert(tools::RUN_COMMAND_TOOL.to_string(), tools::run_command_tool());

        let mut prompts = HashMap::new();
        prompts.insert(
            prompts::RUN_COMMAND_PROMPT.to_string(),
            prompts::run_command_prompt(),
        );

        Self {
            executor,
            tools: Arc::new(tools),
            prompts: Arc::new(prompts),
        }
    }

    pub fn tool_list(&self) -> Vec<Tool> {
        self.tools.values().cloned().collect()
    }

    pub fn prompt_list(&self) -> Vec<Prompt> {
        self.prompts.values().cloned().collect()
    }

    pub async fn handle_tool_call(
        &self,
        params: CallToolRequestParam,
    ) -> Result<CallToolResult, CommandError> {
        debug!(tool = %params.name, "Received tool call");
        match params.name.as_ref() {
            tools::RUN_COMMAND_TOOL => {
                let outcome =
                    tools::run_command(self.executor.as_ref(), params.arguments.as_ref()).await?;
                Ok(tools::to_call_tool_result(outcome))
            }
            other => Err(CommandError::UnknownTool(other.to_string())),
        }
    }

    pub async fn handle_get_prompt(
        &self,
        params: GetPromptRequestParam,
    ) -> Result<GetPromptResult, CommandError> {
        debug!(prompt = %params.name, "Received prompt request");
        match params.name.as_str() {
            prompts::RUN_COMMAND_PROMPT => {
                let messages =
                    prompts::run_command(self.executor.as_ref(), params.arguments.as_ref()).await?;
                Ok(prompts::to_get_prompt_result(messages))
            }
            other => Err(CommandError::UnknownPrompt(other.to_string())),
        }
    }
}

impl ServerHandler for CommandServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Runs shell commands on the host. Call the run_command tool with a `command` string; \
                 output comes back as text content (error, stdout, stderr). The run_command prompt \
                 inserts a command's output into the conversation."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_list(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.handle_tool_call(request).await.map_err(mcp_error)
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            prompts: self.prompt_list(),
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.handle_get_prompt(request).await.map_err(mcp_error)
    }
}
