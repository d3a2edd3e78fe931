// commands-server/src/main.rs
mod cli;
mod prompts;
mod server;
mod tools;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::Cli;
use commands_core::ShellExecutor;
use rmcp::{ServiceExt, transport::stdio};
use server::CommandServer;
use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logs go to stderr (stdout carries the protocol) and optionally to a file.
/// The returned guard must live until shutdown so the file writer flushes.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_level(true);

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let log_dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Log file path '{}' has no file name", path.display()))?;
            fs::create_dir_all(log_dir).with_context(|| {
                format!("Failed to create log directory {}", log_dir.display())
            })?;

            let file_appender = tracing_appender::rolling::never(log_dir, file_name);
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking_writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}).",
        default_level
    );
    Ok(guard)
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.executor_config();
    info!(shell = %config.shell, timeout = ?config.timeout, "Starting {} server...", server::SERVER_NAME);

    let command_server = CommandServer::new(Arc::new(ShellExecutor::new(config)));
    let ct = CancellationToken::new();

    let shutdown = ct.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, shutting down.");
            shutdown.cancel();
        }
    });

    let service = command_server
        .serve_with_ct(stdio(), ct)
        .await
        .map_err(|e| anyhow!("Failed to start MCP service: {}", e))?;

    let reason = service
        .waiting()
        .await
        .context("MCP service task failed")?;
    info!(reason = ?reason, "{} server stopped.", server::SERVER_NAME);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Server error");
            ExitCode::FAILURE
        }
    }
}
