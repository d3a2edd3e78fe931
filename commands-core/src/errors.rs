// commands-core/src/errors.rs
use thiserror::Error;

/// Errors surfaced to the protocol layer as call failures.
///
/// Decode problems (`InvalidArgument`, `UnknownTool`, `UnknownPrompt`) are kept
/// apart from `Execution` so callers can tell a malformed request from a
/// command that ran and failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The `command` argument was missing, empty, or not coercible to text.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A tool call named a tool this server does not register.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A prompt request named a prompt this server does not register.
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    /// The command exited non-zero, was killed, or could not be spawned.
    #[error("Execution failed: {0}")]
    Execution(String),
}

impl CommandError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CommandError::InvalidArgument(msg.into())
    }

    /// True for errors caused by the shape of the request rather than by running it.
    pub fn is_invalid_request(&self) -> bool {
        !matches!(self, CommandError::Execution(_))
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = CommandError::invalid_argument("Command is required");
        assert_eq!(err.to_string(), "Invalid argument: Command is required");
        assert_eq!(
            CommandError::UnknownTool("rm_rf".into()).to_string(),
            "Unknown tool: rm_rf"
        );
    }

    #[test]
    fn test_request_errors_are_distinct_from_execution() {
        assert!(CommandError::invalid_argument("x").is_invalid_request());
        assert!(CommandError::UnknownPrompt("x".into()).is_invalid_request());
        assert!(!CommandError::Execution("boom".into()).is_invalid_request());
    }
}
