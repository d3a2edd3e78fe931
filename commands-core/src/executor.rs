// commands-core/src/executor.rs

//! Runs shell commands and captures their output.

use crate::config::ExecutorConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::io;
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long to wait for the streams to drain once a timed out command is killed.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Captured output of one command.
///
/// `error` is `None` exactly when the command exited 0. Both streams may be
/// non-empty either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Something that can run a command string.
///
/// Handlers only see this trait, so a restricted or remote backend can stand in
/// for [`ShellExecutor`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `command` to completion. Never fails: problems are reported in
    /// [`ExecutionResult::error`].
    async fn execute(&self, command: &str) -> ExecutionResult;
}

/// Executes commands through the host shell.
///
/// **Warning:** commands run unsandboxed with the server's user, environment
/// and working directory. Anything the user can do, the command can do.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    config: ExecutorConfig,
}

impl ShellExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        debug!(
            shell = %self.config.shell,
            timeout = ?self.config.timeout,
            "Executing shell command: {}",
            command
        );

        // stdin stays closed: the server's own stdin carries the protocol.
        let expression = duct::cmd(
            self.config.shell.as_str(),
            [self.config.shell_arg.as_str(), command],
        )
        .stdin_null()
        .stdout_capture()
        .stderr_capture()
        .unchecked();

        // The shell leads its own process group so a timeout can take down
        // pipelines and background jobs along with it.
        #[cfg(unix)]
        let expression = expression.before_spawn(|cmd| {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
            Ok(())
        });

        let handle = match expression.start() {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                warn!(command = command, error = %e, "Failed to spawn command process");
                return ExecutionResult::failure(
                    format!("Failed to spawn command '{}': {}", command, e),
                    String::new(),
                    String::new(),
                );
            }
        };

        let waiter = Arc::clone(&handle);
        let mut wait = tokio::task::spawn_blocking(move || waiter.wait().cloned());

        let joined = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut wait).await {
                Ok(joined) => joined,
                Err(_) => return timed_out(command, limit, &handle, wait).await,
            },
            None => wait.await,
        };

        match joined {
            Ok(Ok(output)) => result_from_output(command, output),
            Ok(Err(e)) => {
                warn!(command = command, error = %e, "Failed waiting for command");
                ExecutionResult::failure(
                    format!("Failed to run command '{}': {}", command, e),
                    String::new(),
                    String::new(),
                )
            }
            Err(e) => {
                warn!(command = command, error = %e, "Command wait task panicked or was cancelled");
                ExecutionResult::failure(
                    format!("Failed to run command '{}': {}", command, e),
                    String::new(),
                    String::new(),
                )
            }
        }
    }
}

async fn timed_out(
    command: &str,
    limit: Duration,
    handle: &duct::Handle,
    wait: JoinHandle<io::Result<Output>>,
) -> ExecutionResult {
    warn!(command = command, timeout = ?limit, "Command timed out, killing it");
    kill_process_group(command, handle);

    let message = format!("Command timed out after {}s: {}", limit.as_secs_f64(), command);
    // Pipes close once every process in the group is gone, so the waiter
    // returns with whatever was written before the kill.
    match tokio::time::timeout(KILL_GRACE, wait).await {
        Ok(Ok(Ok(output))) => {
            ExecutionResult::failure(message, lossy(&output.stdout), lossy(&output.stderr))
        }
        _ => {
            warn!(command = command, "Output of timed out command could not be collected");
            ExecutionResult::failure(message, String::new(), String::new())
        }
    }
}

#[cfg(unix)]
fn kill_process_group(command: &str, handle: &duct::Handle) {
    for pid in handle.pids() {
        // The group id equals the shell's pid, see `process_group(0)` above.
        let rc = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) };
        if rc != 0 {
            warn!(
                command = command,
                pid = pid,
                error = %io::Error::last_os_error(),
                "Failed to kill process group of timed out command"
            );
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(command: &str, handle: &duct::Handle) {
    if let Err(e) = handle.kill() {
        warn!(command = command, error = %e, "Failed to kill timed out command");
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

fn result_from_output(command: &str, output: Output) -> ExecutionResult {
    let stdout = lossy(&output.stdout);
    let stderr = lossy(&output.stderr);

    debug!(
        "Shell command exit status: {:?}\nStdout preview (first 3 lines):\n{}\nStderr preview (first 3 lines):\n{}",
        output.status.code(),
        stdout.lines().take(3).collect::<Vec<_>>().join("\n"),
        stderr.lines().take(3).collect::<Vec<_>>().join("\n")
    );

    if output.status.success() {
        return ExecutionResult::success(stdout, stderr);
    }

    // Mirrors the shape of stderr so the ERROR segment reads like the shell's own complaint.
    let error = match output.status.code() {
        Some(_) => format!("Command failed: {}\n{}", command, stderr),
        None => format!("Command terminated by signal: {}\n{}", command, stderr),
    };
    ExecutionResult::failure(error, stdout, stderr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// Zombies count as gone: they have exited and only wait to be reaped.
    #[cfg(unix)]
    fn process_alive(pid: libc::pid_t) -> bool {
        if unsafe { libc::kill(pid, 0) } != 0 {
            return false;
        }
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .and_then(|rest| rest.split_whitespace().next())
                .map_or(true, |state| state != "Z"),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_execute_echo() {
        let executor = ShellExecutor::default();
        let result = executor.execute("echo hi").await;
        assert!(!result.is_failure(), "unexpected failure: {:?}", result);
        assert_eq!(result.stdout.trim(), "hi");
        assert!(result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_exact_stdout() {
        let result = ShellExecutor::default().execute("echo hi").await;
        assert_eq!(result, ExecutionResult::success("hi\n".into(), String::new()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_keeps_streams() {
        let result = ShellExecutor::default()
            .execute("echo partial; echo oops >&2; exit 3")
            .await;
        assert!(result.is_failure());
        assert_eq!(result.stdout, "partial\n");
        assert_eq!(result.stderr, "oops\n");
        let error = result.error.unwrap();
        assert!(error.starts_with("Command failed: echo partial"));
        assert!(error.ends_with("oops\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_one_has_error_message() {
        let result = ShellExecutor::default().execute("exit 1").await;
        assert!(result.is_failure());
        assert!(!result.error.unwrap_or_default().is_empty());
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_nonexistent_command() {
        let result = ShellExecutor::default()
            .execute("this_command_does_not_exist_qwertyuiop")
            .await;
        assert!(result.is_failure());
        assert!(
            result.stderr.contains("not found") || result.stderr.contains("is not recognized"),
            "stderr was: {}",
            result.stderr
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let config = ExecutorConfig::default().with_shell("/definitely/not/a/shell");
        let result = ShellExecutor::new(config).execute("echo hi").await;
        assert!(result.is_failure());
        assert!(result.error.unwrap().contains("Failed to spawn command 'echo hi'"));
        assert!(result.stdout.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_command() {
        let config = ExecutorConfig::default().with_timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let result = ShellExecutor::new(config).execute("sleep 3 | cat").await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(result.is_failure());
        assert!(result.error.unwrap().starts_with("Command timed out after"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_descendants_and_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("sleep.pid");
        let command = format!(
            "echo partial; sleep 30 & echo $! > {}; wait",
            pid_file.display()
        );
        let config = ExecutorConfig::default().with_timeout(Some(Duration::from_millis(300)));

        let started = Instant::now();
        let result = ShellExecutor::new(config).execute(&command).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(result
            .error
            .as_deref()
            .unwrap_or_default()
            .starts_with("Command timed out after"));
        assert_eq!(result.stdout, "partial\n");

        let pid: libc::pid_t = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut alive = true;
        for _ in 0..50 {
            if !process_alive(pid) {
                alive = false;
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(!alive, "background sleep {} survived the timeout", pid);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_not_hit_by_fast_command() {
        let config = ExecutorConfig::default().with_timeout(Some(Duration::from_secs(10)));
        let result = ShellExecutor::new(config).execute("printf ok").await;
        assert_eq!(result, ExecutionResult::success("ok".into(), String::new()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_current_directory() {
        let result = ShellExecutor::default().execute("pwd").await;
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            std::path::Path::new(result.stdout.trim()).canonicalize().unwrap(),
            cwd.canonicalize().unwrap()
        );
    }
}
