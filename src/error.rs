//! Error types for socks4d
//!
//! This module defines all custom error types used throughout the relay.

use crate::socks::{Direction, ProtocolVersion};
use std::io;
use std::net::SocketAddrV4;
use thiserror::Error;

/// Main error type for socks4d operations
#[derive(Error, Debug)]
pub enum ProxyError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS handshake error
    #[error("Handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    /// Outbound connection could not be established
    #[error("Dial to {addr} failed: {source}")]
    Dial {
        /// Destination that was dialed
        addr: SocketAddrV4,
        /// Underlying connect error
        #[source]
        source: io::Error,
    },

    /// Relay terminated with an error
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
}

/// SOCKS handshake errors
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// Read or write failure, including a truncated request
    #[error("{0}")]
    Io(#[from] io::Error),

    /// Version byte other than 4
    #[error("invalid protocol version {0}")]
    UnsupportedVersion(u8),

    /// Command byte other than CONNECT
    #[error("invalid protocol command {0}")]
    CommandNotSupported(u8),

    /// The server is configured for a protocol it cannot speak
    #[error("unsupported protocol {0}")]
    UnsupportedProtocol(ProtocolVersion),

    /// The client did not finish the request in time
    #[error("handshake timed out after {0}s")]
    Timeout(u64),
}

/// Relay termination error, tagged with the failing direction
#[derive(Error, Debug)]
#[error("{direction}: {source}")]
pub struct RelayError {
    /// Direction whose copy failed
    pub direction: Direction,
    /// Underlying IO error
    #[source]
    pub source: io::Error,
}

impl RelayError {
    /// Create a new relay error
    pub fn new(direction: Direction, source: io::Error) -> Self {
        RelayError { direction, source }
    }
}

/// Reply codes for SOCKS4 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Request granted
    Granted = 90,
    /// Request rejected or failed
    Rejected = 91,
    /// Rejected because the server cannot connect to identd on the client
    NoIdentd = 92,
    /// Rejected because identd reports a different user id
    IdentdFailed = 93,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for ReplyCode {
    type Error = HandshakeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            90 => Ok(ReplyCode::Granted),
            91 => Ok(ReplyCode::Rejected),
            92 => Ok(ReplyCode::NoIdentd),
            93 => Ok(ReplyCode::IdentdFailed),
            _ => Err(HandshakeError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown reply code {}", value),
            ))),
        }
    }
}

impl From<&HandshakeError> for ReplyCode {
    fn from(_: &HandshakeError) -> Self {
        // SOCKS4 has no finer-grained code for protocol errors
        ReplyCode::Rejected
    }
}
