//! # socks4d - SOCKS4 CONNECT Relay
//!
//! socks4d accepts TCP clients, reads a SOCKS4 CONNECT request from each,
//! dials the requested IPv4 destination and relays bytes both ways until
//! either side is done.
//!
//! ## Features
//!
//! - **SOCKS4 CONNECT**: 8-byte replies, BIND and unknown versions rejected
//! - **Fixed Worker Pool**: a bounded number of sessions served at once
//! - **Half-Close Aware Relay**: one direction finishing does not cut the other
//! - **Guaranteed Close**: every accepted connection is closed exactly once
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socks4d::config::load_config;
//! use socks4d::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! accept -> pending queue -> worker (handshake, dial, relay) -> completion sink
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod helper;
pub mod pool;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{HandshakeError, ProxyError, ReplyCode};
pub use server::{run_server, Server};

/// Version of the socks4d library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "socks4d");
    }
}
