//! Listener and accept loop
//!
//! Accepts client connections and hands each one to the worker pool.

use crate::config::ServerConfig;
use crate::helper::RetryConfig;
use crate::pool::{PoolStats, WorkerPool};
use crate::transport::{SocketOpts, TcpDialer};
use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// SOCKS4 relay server
pub struct Server {
    /// Server configuration
    config: ServerConfig,
    /// Bound listener
    listener: TcpListener,
    /// Pool serving accepted connections
    pool: WorkerPool<TcpStream>,
    /// Options applied to accepted sockets
    socket_opts: SocketOpts,
}

impl Server {
    /// Validate the configuration, bind the listener and start the pool
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate().map_err(|e| anyhow!(e))?;

        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("Failed to listen on {}", config.listen_addr))?;

        let dialer = Arc::new(TcpDialer::from_config(&config.tcp));
        let pool = WorkerPool::new(&config, dialer)?;
        let socket_opts = SocketOpts::from_tcp_config(&config.tcp);

        Ok(Server {
            config,
            listener,
            pool,
            socket_opts,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Pool statistics
    pub fn stats(&self) -> Arc<PoolStats> {
        self.pool.stats().clone()
    }

    /// Accept connections until shutdown or too many accept failures
    ///
    /// On the way out the listener is closed first, then the pool drains.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let Server {
            config,
            listener,
            pool,
            socket_opts,
        } = self;

        info!("Listening on {}", listener.local_addr()?);

        let retry = RetryConfig::default();
        let mut consecutive_errors = 0u32;

        let result = loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        consecutive_errors = 0;

                        if let Err(e) = socket_opts.apply(&stream) {
                            warn!("{}: failed to apply socket options: {}", peer, e);
                        }

                        // Blocks while every worker is busy
                        tokio::select! {
                            slot = pool.reserve() => match slot {
                                Some(slot) => slot.dispatch(stream, peer),
                                None => pool.reject(stream, peer),
                            },
                            _ = shutdown_rx.recv() => {
                                info!("Shutdown signal received, stopping listener");
                                pool.reject(stream, peer);
                                break Ok(());
                            }
                        }
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= config.max_accept_errors {
                            error!("Accept failed {} times in a row, giving up", consecutive_errors);
                            break Err(anyhow::Error::new(e).context("Listener failed"));
                        }

                        let delay = retry.delay_for_attempt(consecutive_errors - 1);
                        warn!(
                            "Accept error: {}. Retrying in {:?} (attempt {}/{})",
                            e, delay, consecutive_errors, config.max_accept_errors
                        );
                        tokio::time::sleep(delay).await;
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping listener");
                    break Ok(());
                }
            }
        };

        drop(listener);
        pool.shutdown(Duration::from_secs(config.shutdown_grace)).await;

        info!("Server stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socks::ProtocolVersion;

    fn test_config() -> ServerConfig {
        ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::bind(test_config()).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.stats().snapshot().total_accepted, 0);
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = ServerConfig {
            protocol: ProtocolVersion::Socks5,
            ..test_config()
        };
        assert!(Server::bind(config).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_address() {
        let config = ServerConfig {
            listen_addr: "not an address".to_string(),
            ..test_config()
        };
        assert!(Server::bind(config).await.is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let server = Server::bind(test_config()).await.unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(server.run(shutdown_rx));
        shutdown_tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
