//! Server module for socks4d
//!
//! This module contains the listener that accepts SOCKS clients and feeds
//! them to the worker pool.

mod listener;

pub use listener::Server;

use crate::config::Config;
use anyhow::Result;
use tokio::sync::broadcast;

/// Run the relay with the given configuration until shutdown
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let server = Server::bind(config.server).await?;
    server.run(shutdown_rx).await
}
