// commands-core/src/request.rs

//! Decoding of loosely-typed call arguments into a [`CommandRequest`].

use crate::errors::{CommandError, Result};
use serde_json::{Map, Value};

/// Name of the single argument both the tool and the prompt accept.
pub const COMMAND_ARG: &str = "command";

/// A validated request to run one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
}

impl CommandRequest {
    /// Decodes the `command` argument.
    ///
    /// Strings are taken as-is, numbers and booleans are stringified. Missing,
    /// `null`, array or object values are rejected, as is an empty string.
    pub fn from_arguments(arguments: Option<&Map<String, Value>>) -> Result<Self> {
        let value = arguments
            .and_then(|args| args.get(COMMAND_ARG))
            .ok_or_else(|| CommandError::invalid_argument("Command is required"))?;

        let command = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => return Err(CommandError::invalid_argument("Command is required")),
            Value::Array(_) | Value::Object(_) => {
                return Err(CommandError::invalid_argument(
                    "'command' must be a string",
                ))
            }
        };

        if command.is_empty() {
            return Err(CommandError::invalid_argument("Command is required"));
        }
        Ok(Self { command })
    }
}
