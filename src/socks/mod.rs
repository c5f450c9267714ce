//! SOCKS4 module for socks4d
//!
//! This module implements the server side of the SOCKS4 protocol, CONNECT
//! command only: request parsing, replies, the handshake state machine,
//! the relay engine and the per-connection handler that ties them together.

mod command;
mod consts;
mod handler;
mod handshake;
mod tcp_relay;
mod types;

pub use command::{build_reply, read_request, Reply};
pub use consts::*;
pub use handler::handle_connection;
pub use handshake::handshake;
pub use tcp_relay::relay_tcp;
pub use types::{Direction, ProtocolVersion, RelayStats, Request, SocksCommand};
