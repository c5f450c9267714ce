//! socks4d - SOCKS4 CONNECT relay
//!
//! This is the main entry point for the socks4d application.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use socks4d::config::{load_config, Config};
use socks4d::run_server;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// socks4d - SOCKS4 CONNECT relay with a fixed worker pool
#[derive(Parser, Debug)]
#[command(name = "socks4d")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configuration file
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Number of workers, overrides the configuration file
    #[arg(short = 'g', long)]
    workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            info!("Configuration loaded from: {:?}", path);
            config
        }
        None => Config::default(),
    };

    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }
    if let Some(workers) = args.workers {
        config.server.pool.workers = workers;
    }

    config
        .server
        .validate()
        .map_err(|e| anyhow!(e))
        .context("Invalid configuration")?;

    info!("socks4d v{}", socks4d::VERSION);
    info!("Listen address: {}", config.server.listen_addr);
    info!("Workers: {}", config.server.pool.workers);

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C and termination signals (cross-platform)
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            error!("Failed to listen for shutdown signals: {}", e);
            return;
        }
        let _ = shutdown_tx_clone.send(true);
    });

    // Run the relay
    run_server(config, shutdown_rx).await
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down...");
    }

    Ok(())
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
