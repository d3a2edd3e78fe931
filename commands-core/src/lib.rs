// commands-core/src/lib.rs

//! Command execution core for `mcp-server-commands`.
//!
//! Everything here is request-scoped: decode a [`CommandRequest`], run it with a
//! [`CommandExecutor`], and shape the [`ExecutionResult`] into a
//! [`ToolCallOutcome`] or prompt messages. Nothing is kept between calls.

pub mod config;
pub mod errors;
pub mod executor;
pub mod format;
pub mod outcome;
pub mod request;

pub use config::ExecutorConfig;
pub use errors::CommandError;
pub use executor::{CommandExecutor, ExecutionResult, ShellExecutor};
pub use format::{format_segments, SegmentLabel, TextSegment};
pub use outcome::{prompt_messages, PromptRole, PromptText, ToolCallOutcome};
pub use request::{CommandRequest, COMMAND_ARG};
