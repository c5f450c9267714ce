//! SOCKS handshake
//!
//! Selects the handshake implementation for the configured protocol,
//! reads the request and always answers with a terminal reply.

use crate::error::{HandshakeError, ReplyCode};
use crate::helper::optional_timeout;
use crate::socks::command::{build_reply, read_request};
use crate::socks::types::{ProtocolVersion, Request};
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Run the server side of the handshake for `protocol`
///
/// Versions without an implementation are answered with a SOCKS4
/// REJECTED reply and fail with [`HandshakeError::UnsupportedProtocol`].
///
/// # Arguments
///
/// * `stream` - The buffered client stream
/// * `protocol` - Protocol configured for the listener
/// * `timeout_secs` - Deadline for reading the request, 0 disables it
/// * `peer` - Client address, used for logging
pub async fn handshake<S>(
    stream: &mut S,
    protocol: ProtocolVersion,
    timeout_secs: u64,
    peer: SocketAddr,
) -> Result<Request, HandshakeError>
where
    S: AsyncBufRead + AsyncWrite + Unpin,
{
    match protocol {
        ProtocolVersion::Socks4 => socks4_handshake(stream, timeout_secs, peer).await,
        unsupported => {
            let err = HandshakeError::UnsupportedProtocol(unsupported);
            reject(stream, &err, peer).await;
            Err(err)
        }
    }
}

/// SOCKS4 handshake
///
/// Replies GRANTED once the request is read and validated, REJECTED on any
/// failure. The reply goes out before the destination is dialed.
async fn socks4_handshake<S>(
    stream: &mut S,
    timeout_secs: u64,
    peer: SocketAddr,
) -> Result<Request, HandshakeError>
where
    S: AsyncBufRead + AsyncWrite + Unpin,
{
    let result = match optional_timeout(timeout_secs) {
        Some(deadline) => match tokio::time::timeout(deadline, read_request(stream)).await {
            Ok(result) => result,
            Err(_) => Err(HandshakeError::Timeout(timeout_secs)),
        },
        None => read_request(stream).await,
    };

    match result {
        Ok(request) => {
            info!("{}: {}", peer, request);
            build_reply(stream, ReplyCode::Granted).await?;
            Ok(request)
        }
        Err(e) => {
            reject(stream, &e, peer).await;
            Err(e)
        }
    }
}

/// Log a failed handshake and send the matching reply
async fn reject<S>(stream: &mut S, err: &HandshakeError, peer: SocketAddr)
where
    S: AsyncWrite + Unpin,
{
    warn!("{}: handshake rejected: {}", peer, err);
    if let Err(write_err) = build_reply(stream, ReplyCode::from(err)).await {
        debug!("{}: failed to send rejection: {}", peer, write_err);
    }
}
