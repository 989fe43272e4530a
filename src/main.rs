#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Initializes the menu bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix transport
//! - Application: Session, Ingest, Router, Replies, State
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::application::session::SessionManager;
use crate::domain::config::{AppConfig, DEFAULT_CONFIG_PATH, LoggingConfig};
use crate::infrastructure::matrix::MatrixTransport;
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "menubot", version, about = "Menu-driven Matrix chat bot")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Run the full flow but never send replies
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(&args.config)?;
    if args.dry_run {
        config.bot.auto_reply_enabled = false;
    }

    // 2. Logging Setup
    let _guard = init_logging(&config.logging)?;

    tracing::info!("{}", logs::STARTING);
    tracing::info!(
        "{}",
        logs::config_loaded(&args.config, &config.services.matrix.username)
    );

    // 3. Transport + Session
    let transport = Arc::new(MatrixTransport::new(
        &config.bot,
        config.services.matrix.display_name.clone(),
    ));
    let manager = SessionManager::new(transport, config.bot.clone());
    let credentials = config.services.matrix.credentials();

    // 4. Run until the connection drops or Ctrl+C
    match manager.run(&credentials, shutdown_signal()).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Fatal: {}", e);
            Err(e.into())
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("{}", logs::shutdown_signal_fail(&e.to_string()));
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate_signal() => tracing::info!("Received SIGTERM"),
    }
}

/// Installs the SIGTERM handler immediately; the returned future waits for it.
#[cfg(unix)]
fn terminate_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::{SignalKind, signal};

    let installed = signal(SignalKind::terminate());
    async move {
        match installed {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                tracing::error!("{}", logs::shutdown_signal_fail(&e.to_string()));
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
fn terminate_signal() -> impl Future<Output = ()> {
    std::future::pending()
}

/// Console layer plus a fresh per-session log file. The returned guard must
/// outlive the program's logging.
fn init_logging(logging: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = Path::new(&logging.directory);
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    // Clear previous session log
    let log_path = dir.join(&logging.file);
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(dir, &logging.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}
