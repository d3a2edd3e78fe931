// commands-server/src/cli.rs
use clap::{ArgAction, Parser};
use commands_core::ExecutorConfig;
use std::path::PathBuf;
use std::time::Duration;

/// MCP server exposing a `run_command` tool and prompt over stdio.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (stderr). RUST_LOG overrides this.
    ///
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Kill commands that run longer than this many seconds. Unbounded by default.
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Shell program used to run commands (default: `sh`, or `cmd` on Windows).
    #[arg(long, value_name = "PROGRAM")]
    pub shell: Option<String>,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn executor_config(&self) -> ExecutorConfig {
        let config = match &self.shell {
            Some(shell) => ExecutorConfig::default().with_shell(shell.clone()),
            None => ExecutorConfig::default(),
        };
        config.with_timeout(self.timeout_secs.map(Duration::from_secs))
    }
}
