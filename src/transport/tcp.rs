//! TCP dialer
//!
//! Opens plain TCP connections to SOCKS destinations.

use super::{Dialer, SocketOpts};
use crate::config::TcpConfig;
use crate::helper::optional_timeout;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddrV4;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{info, warn};

/// TCP dialer for destination connections
#[derive(Debug, Clone)]
pub struct TcpDialer {
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout, None blocks until the OS gives up
    connect_timeout: Option<Duration>,
}

impl TcpDialer {
    /// Create a new TCP dialer with default options
    pub fn with_defaults() -> Self {
        TcpDialer {
            socket_opts: SocketOpts::default(),
            connect_timeout: None,
        }
    }

    /// Create a TCP dialer from configuration
    pub fn from_config(config: &TcpConfig) -> Self {
        TcpDialer {
            socket_opts: SocketOpts::from_tcp_config(config),
            connect_timeout: optional_timeout(config.connect_timeout),
        }
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&self, addr: SocketAddrV4) -> io::Result<TcpStream> {
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, TcpStream::connect(addr))
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect to {} timed out after {:?}", addr, timeout),
                    )
                })??,
            None => TcpStream::connect(addr).await?,
        };

        if let Err(e) = self.socket_opts.apply(&stream) {
            warn!("Failed to apply socket options to {}: {}", addr, e);
        }

        info!("Successfully connected to {}", addr);

        Ok(stream)
    }
}
