// commands-core/src/config.rs

//! Executor configuration.

use std::time::Duration;

/// How commands are handed to the shell.
///
/// `Default` is the platform shell (`sh -c` on Unix, `cmd /C` on Windows) with
/// no timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub shell: String,
    pub shell_arg: String,
    pub timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        Self {
            shell: shell.to_string(),
            shell_arg: shell_arg.to_string(),
            timeout: None,
        }
    }
}

impl ExecutorConfig {
    /// Replaces the shell program, picking the command flag that program expects.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        let shell = shell.into();
        self.shell_arg = command_flag_for(&shell).to_string();
        self.shell = shell;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

// `cmd` takes `/C`; everything sh-like takes `-c`. PowerShell accepts `-c` as well.
fn command_flag_for(shell: &str) -> &'static str {
    let program = shell
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(shell)
        .to_ascii_lowercase();
    match program.as_str() {
        "cmd" | "cmd.exe" => "/C",
        _ => "-c",
    }
}
