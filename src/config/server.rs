//! Server configuration types
//!
//! Defines the main configuration structures for the relay.

use super::{PoolConfig, TcpConfig};
use crate::socks::ProtocolVersion;
use serde::{Deserialize, Serialize};

/// Default listening address
fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Default number of consecutive accept errors before giving up
fn default_max_accept_errors() -> u32 {
    10
}

/// Default time given to busy workers on shutdown, in seconds
fn default_shutdown_grace() -> u64 {
    5
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to accept SOCKS clients on (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Protocol spoken to clients
    #[serde(default)]
    pub protocol: ProtocolVersion,

    /// Consecutive accept failures tolerated before the listener stops
    #[serde(default = "default_max_accept_errors")]
    pub max_accept_errors: u32,

    /// Seconds a client has to send its request, 0 waits forever
    #[serde(default)]
    pub handshake_timeout: u64,

    /// Seconds busy workers get to finish on shutdown before being aborted
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: u64,

    /// Worker pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// TCP socket configuration
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            protocol: ProtocolVersion::default(),
            max_accept_errors: default_max_accept_errors(),
            handshake_timeout: 0,
            shutdown_grace: default_shutdown_grace(),
            pool: PoolConfig::default(),
            tcp: TcpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.trim().is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if !self.protocol.is_supported() {
            return Err(format!(
                "protocol {} is not supported, only socks4 is",
                self.protocol
            ));
        }
        if self.max_accept_errors == 0 {
            return Err("max_accept_errors must be greater than 0".to_string());
        }
        self.pool.validate()?;
        self.tcp.validate()
    }
}
