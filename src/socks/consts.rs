//! SOCKS4 protocol constants
//!
//! Defines all constants used in the SOCKS4 protocol implementation.

/// SOCKS4 protocol version
pub const SOCKS4_VERSION: u8 = 0x04;

/// SOCKS5 protocol version (recognised only to be refused)
pub const SOCKS5_VERSION: u8 = 0x05;

// Commands
/// CONNECT command
pub const SOCKS4_CMD_CONNECT: u8 = 0x01;
/// BIND command (not implemented)
pub const SOCKS4_CMD_BIND: u8 = 0x02;

// Reply codes
/// Request granted
pub const SOCKS4_REPLY_GRANTED: u8 = 90;
/// Request rejected or failed
pub const SOCKS4_REPLY_REJECTED: u8 = 91;
/// Request rejected, no identd on the client
pub const SOCKS4_REPLY_NO_IDENTD: u8 = 92;
/// Request rejected, identd reports a different user id
pub const SOCKS4_REPLY_IDENTD_FAILED: u8 = 93;

/// First byte of every reply
pub const SOCKS4_REPLY_VERSION: u8 = 0x00;

/// Reply length in bytes
pub const SOCKS4_REPLY_LEN: usize = 8;

/// User id terminator
pub const SOCKS4_USERID_TERMINATOR: u8 = 0x00;
