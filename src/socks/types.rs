//! SOCKS4 type definitions
//!
//! Defines the core types used in SOCKS4 protocol handling.

use super::consts::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Protocol spoken on inbound connections
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// SOCKS version 4, CONNECT only
    #[default]
    #[serde(rename = "socks4")]
    Socks4,
    /// SOCKS version 5 (not implemented)
    #[serde(rename = "socks5")]
    Socks5,
}

impl ProtocolVersion {
    /// Whether a handshake implementation exists for this version
    pub fn is_supported(self) -> bool {
        matches!(self, ProtocolVersion::Socks4)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::Socks4 => write!(f, "socks4"),
            ProtocolVersion::Socks5 => write!(f, "socks5"),
        }
    }
}

/// SOCKS4 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// CONNECT - establish a TCP connection to target
    Connect,
    /// BIND - wait for incoming connection (not implemented)
    Bind,
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS4_CMD_CONNECT => Some(SocksCommand::Connect),
            SOCKS4_CMD_BIND => Some(SocksCommand::Bind),
            _ => None,
        }
    }

    /// Convert SocksCommand to byte
    pub fn to_byte(self) -> u8 {
        match self {
            SocksCommand::Connect => SOCKS4_CMD_CONNECT,
            SocksCommand::Bind => SOCKS4_CMD_BIND,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
        }
    }
}

/// A fully read SOCKS4 request
///
/// ```text
/// +----+----+----+----+----+----+----+----+----+----+....+----+
/// | VN | CD | DSTPORT |      DSTIP        | USERID       |NULL|
/// +----+----+----+----+----+----+----+----+----+----+....+----+
///   1    1      2              4           variable       1
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Protocol version byte
    pub version: u8,
    /// Requested command
    pub command: SocksCommand,
    /// Destination port
    pub port: u16,
    /// Destination IPv4 address
    pub ip: Ipv4Addr,
    /// User id without its terminator; never validated
    pub user_id: String,
}

impl Request {
    /// Create a CONNECT request
    pub fn connect(ip: Ipv4Addr, port: u16, user_id: impl Into<String>) -> Self {
        Request {
            version: SOCKS4_VERSION,
            command: SocksCommand::Connect,
            port,
            ip,
            user_id: user_id.into(),
        }
    }

    /// Destination socket address
    pub fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }

    /// Serialize the request to wire bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(9 + self.user_id.len());
        bytes.push(self.version);
        bytes.push(self.command.to_byte());
        bytes.extend_from_slice(&self.port.to_be_bytes());
        bytes.extend_from_slice(&self.ip.octets());
        bytes.extend_from_slice(self.user_id.as_bytes());
        bytes.push(SOCKS4_USERID_TERMINATOR);
        bytes
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ver: {:X} Cmd: {:X} Port: {} IP: {} User: {}",
            self.version,
            self.command.to_byte(),
            self.port,
            self.ip,
            self.user_id
        )
    }
}

/// Relay direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to destination
    Upstream,
    /// Destination to client
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upstream => write!(f, "client -> remote"),
            Direction::Downstream => write!(f, "remote -> client"),
        }
    }
}

/// Byte counts of a finished relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Bytes copied from client to destination
    pub upstream: u64,
    /// Bytes copied from destination to client
    pub downstream: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks_command_from_byte() {
        assert_eq!(SocksCommand::from_byte(1), Some(SocksCommand::Connect));
        assert_eq!(SocksCommand::from_byte(2), Some(SocksCommand::Bind));
        assert_eq!(SocksCommand::from_byte(3), None);
        assert_eq!(SocksCommand::from_byte(0), None);
    }

    #[test]
    fn test_socks_command_display() {
        assert_eq!(format!("{}", SocksCommand::Connect), "CONNECT");
        assert_eq!(format!("{}", SocksCommand::Bind), "BIND");
    }

    #[test]
    fn test_protocol_version() {
        assert!(ProtocolVersion::Socks4.is_supported());
        assert!(!ProtocolVersion::Socks5.is_supported());
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Socks4);
        assert_eq!(format!("{}", ProtocolVersion::Socks5), "socks5");
    }

    #[test]
    fn test_request_destination() {
        let req = Request::connect(Ipv4Addr::new(93, 184, 216, 34), 80, "root");
        assert_eq!(
            req.destination(),
            SocketAddrV4::new(Ipv4Addr::new(93, 184, 216, 34), 80)
        );
    }

    #[test]
    fn test_request_to_bytes() {
        let req = Request::connect(Ipv4Addr::new(93, 184, 216, 34), 80, "root");
        assert_eq!(
            req.to_bytes(),
            vec![4, 1, 0, 80, 93, 184, 216, 34, b'r', b'o', b'o', b't', 0]
        );
    }

    #[test]
    fn test_request_display() {
        let req = Request::connect(Ipv4Addr::new(127, 0, 0, 1), 8080, "alice");
        assert_eq!(
            format!("{}", req),
            "Ver: 4 Cmd: 1 Port: 8080 IP: 127.0.0.1 User: alice"
        );
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(format!("{}", Direction::Upstream), "client -> remote");
        assert_eq!(format!("{}", Direction::Downstream), "remote -> client");
    }
}
