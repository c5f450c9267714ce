//! Test utilities and mocks for socks4d
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use socks4d::config::{Config, PoolConfig, ServerConfig};
use socks4d::pool::PoolStats;
use socks4d::Server;
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Unwrap the IPv4 address a test listener is bound to
pub fn v4(addr: SocketAddr) -> SocketAddrV4 {
    match addr {
        SocketAddr::V4(addr) => addr,
        other => panic!("expected IPv4 address, got {}", other),
    }
}

/// Start a destination that echoes every byte back
///
/// The write side is shut down once the peer half-closes.
pub async fn spawn_echo_server() -> SocketAddrV4 {
    let (listener, addr) = create_test_listener().await;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut r, mut w) = stream.split();
                let _ = tokio::io::copy(&mut r, &mut w).await;
                let _ = w.shutdown().await;
            });
        }
    });

    v4(addr)
}

/// An address nothing listens on
pub async fn closed_port() -> SocketAddrV4 {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    v4(addr)
}

/// Read until the peer closes, treating a reset as a close
pub async fn read_until_closed(stream: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => break,
            Err(e) => panic!("read failed: {}", e),
        }
    }
    received
}

/// A relay running in the background
pub struct TestRelay {
    /// Address clients connect to
    pub addr: SocketAddr,
    /// Pool statistics
    pub stats: Arc<PoolStats>,
    /// Sends the shutdown signal
    pub shutdown_tx: broadcast::Sender<bool>,
    /// The server task
    pub handle: JoinHandle<anyhow::Result<()>>,
}

impl TestRelay {
    /// Bind and run a relay with the given configuration
    pub async fn start(config: Config) -> Self {
        let server = Server::bind(config.server).await.unwrap();
        let addr = server.local_addr().unwrap();
        let stats = server.stats();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(shutdown_rx));

        TestRelay {
            addr,
            stats,
            shutdown_tx,
            handle,
        }
    }

    /// Connect a fresh client
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    /// Signal shutdown and wait for the server to stop
    pub async fn stop(self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(true);
        self.handle.await.unwrap()
    }
}

/// Test configuration builder
pub struct TestConfigBuilder {
    workers: usize,
    queue_capacity: usize,
    handshake_timeout: u64,
    shutdown_grace: u64,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            workers: 4,
            queue_capacity: 1,
            handshake_timeout: 0,
            shutdown_grace: 1,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set pending queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set handshake timeout in seconds
    pub fn handshake_timeout(mut self, secs: u64) -> Self {
        self.handshake_timeout = secs;
        self
    }

    /// Set shutdown grace in seconds
    pub fn shutdown_grace(mut self, secs: u64) -> Self {
        self.shutdown_grace = secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        Config {
            server: ServerConfig {
                listen_addr: "127.0.0.1:0".to_string(),
                handshake_timeout: self.handshake_timeout,
                shutdown_grace: self.shutdown_grace,
                pool: PoolConfig {
                    workers: self.workers,
                    queue_capacity: self.queue_capacity,
                },
                ..Default::default()
            },
        }
    }
}

/// Mock SOCKS4 request data
pub mod socks4_mock {
    use socks4d::socks::*;
    use std::net::SocketAddrV4;

    /// Create a CONNECT request with an empty user id
    pub fn create_connect(dest: SocketAddrV4) -> Vec<u8> {
        Request::connect(*dest.ip(), dest.port(), "").to_bytes()
    }

    /// Create a CONNECT request carrying a user id
    pub fn create_connect_with_user(dest: SocketAddrV4, user: &str) -> Vec<u8> {
        Request::connect(*dest.ip(), dest.port(), user).to_bytes()
    }

    /// Create a BIND request
    pub fn create_bind(dest: SocketAddrV4) -> Vec<u8> {
        let mut request = create_connect(dest);
        request[1] = SOCKS4_CMD_BIND;
        request
    }

    /// Create a request with an arbitrary version byte
    pub fn create_with_version(version: u8, dest: SocketAddrV4) -> Vec<u8> {
        let mut request = create_connect(dest);
        request[0] = version;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_listener() {
        let (listener, addr) = create_test_listener().await;
        assert!(addr.port() > 0);
        drop(listener);
    }

    #[test]
    fn test_config_builder() {
        let config = TestConfigBuilder::new()
            .workers(8)
            .queue_capacity(2)
            .handshake_timeout(3)
            .build();

        assert_eq!(config.server.pool.workers, 8);
        assert_eq!(config.server.pool.queue_capacity, 2);
        assert_eq!(config.server.handshake_timeout, 3);
        assert!(config.server.validate().is_ok());
    }

    #[test]
    fn test_socks4_mock_connect() {
        let dest = SocketAddrV4::new([10, 0, 0, 1].into(), 80);
        let request = socks4_mock::create_connect_with_user(dest, "bob");
        assert_eq!(request, vec![4, 1, 0, 80, 10, 0, 0, 1, b'b', b'o', b'b', 0]);
    }

    #[test]
    fn test_socks4_mock_bind() {
        let dest = SocketAddrV4::new([10, 0, 0, 1].into(), 80);
        let request = socks4_mock::create_bind(dest);
        assert_eq!(request[1], 2);
    }
}
