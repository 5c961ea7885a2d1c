//! SkillDesk - local library manager for agent skills
//!
//! Main entry point: one-shot commands or a JSON-lines bridge on stdio.

mod cli;
mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use ipc_proto::{Request, Response};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    let mut config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
        app_core::AppConfig::default()
    });

    if let Err(e) = app_log::cleanup_old_logs(config.logging.retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    if let Some(root) = cli.library.clone() {
        config.library.root = Some(root);
    }

    tracing::info!("SkillDesk starting...");
    let state = app_core::init(config)?;

    let outcome = run(state, cli.command).await;

    app_core::shutdown();
    outcome
}

async fn run(state: &'static app_core::AppState, command: Command) -> Result<()> {
    let Some(request) = command.to_request()? else {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        serve::serve(&state.commands, stdin, tokio::io::stdout()).await?;
        return Ok(());
    };

    let (_, response) = state
        .commands
        .handle(app_core::SessionContext::new(), request)
        .await;

    if let Response::Error { code, message } = &response {
        anyhow::bail!("{} ({:?})", message, code);
    }

    // Temp archives are swept at exit, so the CLI always keeps a copy
    if let (Command::Export { output, .. }, Response::Archive { path }) = (&command, &response) {
        let dest = match output {
            Some(dest) => dest.clone(),
            None => PathBuf::from(path.file_name().context("Archive path has no file name")?),
        };
        tokio::fs::copy(path, &dest)
            .await
            .with_context(|| format!("Failed to copy archive to {}", dest.display()))?;
        state
            .commands
            .handle(
                app_core::SessionContext::new(),
                Request::ReleaseArchive {
                    path: path.display().to_string(),
                },
            )
            .await;
        println!("{}", dest.display());
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
