//! TCP socket configuration
//!
//! Options applied to accepted client sockets and dialed destination
//! sockets.

use serde::{Deserialize, Serialize};

/// Default TCP_NODELAY setting
fn default_nodelay() -> bool {
    true
}

/// Default keepalive seconds
fn default_keepalive_secs() -> u64 {
    20
}

/// Default keepalive interval
fn default_keepalive_interval() -> u64 {
    8
}

/// TCP socket configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TcpConfig {
    /// Enable TCP_NODELAY
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,

    /// TCP keepalive timeout in seconds, 0 disables keepalive
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// TCP keepalive interval in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: u64,

    /// Destination connect timeout in seconds, 0 waits for the OS
    #[serde(default)]
    pub connect_timeout: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            nodelay: default_nodelay(),
            keepalive_secs: default_keepalive_secs(),
            keepalive_interval: default_keepalive_interval(),
            connect_timeout: 0,
        }
    }
}

impl TcpConfig {
    /// Validate the TCP configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.keepalive_secs > 0 && self.keepalive_interval == 0 {
            return Err("keepalive_interval must be greater than 0 when keepalive is on".to_string());
        }
        Ok(())
    }
}
