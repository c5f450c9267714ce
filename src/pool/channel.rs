//! Connections travelling through the pool
//!
//! An accepted connection with its metadata, and the record a worker hands
//! to the completion sink.

use crate::socks::RelayStats;
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// An accepted client connection waiting for, or owned by, a worker
#[derive(Debug)]
pub struct Inbound<S> {
    /// Sequence number assigned at dispatch
    pub(crate) id: u64,
    /// The client stream
    pub(crate) stream: S,
    /// Client address
    pub(crate) peer: SocketAddr,
    /// When the connection was handed to the pool
    pub(crate) accepted_at: Instant,
}

impl<S> Inbound<S> {
    /// Wrap an accepted stream
    pub fn new(id: u64, stream: S, peer: SocketAddr) -> Self {
        Inbound {
            id,
            stream,
            peer,
            accepted_at: Instant::now(),
        }
    }

    /// Sequence number
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Client address
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Time since the connection entered the pool
    pub fn age(&self) -> Duration {
        self.accepted_at.elapsed()
    }

    /// Get the underlying stream
    pub fn into_stream(self) -> S {
        self.stream
    }

    /// Get a mutable reference to the stream
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Relay ran to completion
    Relayed(RelayStats),
    /// Handshake failed, nothing was dialed
    HandshakeFailed,
    /// Destination could not be reached
    DialFailed,
    /// Relay ended with an IO error
    RelayFailed,
    /// Worker let go of the connection without finishing
    Aborted,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Relayed(stats) => write!(
                f,
                "relayed {} bytes up, {} bytes down",
                stats.upstream, stats.downstream
            ),
            SessionOutcome::HandshakeFailed => write!(f, "handshake failed"),
            SessionOutcome::DialFailed => write!(f, "dial failed"),
            SessionOutcome::RelayFailed => write!(f, "relay failed"),
            SessionOutcome::Aborted => write!(f, "aborted"),
        }
    }
}

/// A connection on its way to being closed
#[derive(Debug)]
pub struct Completed<S> {
    /// The connection
    pub inbound: Inbound<S>,
    /// How its session ended
    pub outcome: SessionOutcome,
}
