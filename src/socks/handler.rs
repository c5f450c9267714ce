//! Connection handler
//!
//! This module provides the per-connection pipeline: handshake, dial,
//! then relay. Each step strictly follows the previous one.

use crate::config::ServerConfig;
use crate::error::ProxyError;
use crate::socks::handshake::handshake;
use crate::socks::tcp_relay::relay_tcp;
use crate::socks::types::RelayStats;
use crate::transport::Dialer;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::{info, warn};

/// Handle one SOCKS4 session on an accepted client stream
///
/// # Protocol Flow
///
/// 1. Handshake (always answered with an 8-byte reply)
/// 2. Dial the requested destination
/// 3. Relay until both directions terminate
///
/// The client stream is borrowed: closing it is left to the caller, on
/// success and on every failure path. The destination stream lives only
/// inside this function.
///
/// # Arguments
///
/// * `client` - The accepted client stream
/// * `peer` - Client address, used for logging
/// * `dialer` - Opens the outbound connection
/// * `config` - Server configuration
pub async fn handle_connection<S, D>(
    client: &mut S,
    peer: SocketAddr,
    dialer: &D,
    config: &ServerConfig,
) -> Result<RelayStats, ProxyError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: Dialer + ?Sized,
{
    // Buffered so bytes pipelined behind the request are relayed, not lost
    let mut client = BufReader::new(client);

    // Failures are logged by the handshake itself
    let request = handshake(
        &mut client,
        config.protocol,
        config.handshake_timeout,
        peer,
    )
    .await?;

    let target = request.destination();

    let remote = match dialer.dial(target).await {
        Ok(remote) => remote,
        Err(source) => {
            warn!("{} -> {}: connect failed: {}", peer, target, source);
            return Err(ProxyError::Dial {
                addr: target,
                source,
            });
        }
    };

    match relay_tcp(&mut client, remote).await {
        Ok(stats) => {
            info!(
                "{} -> {}: done ({} bytes up, {} bytes down)",
                peer, target, stats.upstream, stats.downstream
            );
            Ok(stats)
        }
        Err(e) => {
            warn!("{} -> {}: relay failed: {}", peer, target, e);
            Err(e.into())
        }
    }
}
