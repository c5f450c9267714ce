//! TCP relay for SOCKS4 CONNECT
//!
//! Copies bytes between the client and the destination until both
//! directions have terminated.

use crate::error::RelayError;
use crate::socks::types::{Direction, RelayStats};
use futures::future::{self, Either};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Relay data bidirectionally between client and destination
///
/// Both directions run concurrently. When the first one finishes:
///
/// * on clean EOF its half-close has already been forwarded, and the other
///   direction is awaited so data still in flight drains;
/// * on error the other direction is cancelled, which releases its halves
///   of both streams, and the error is returned.
///
/// Either way no copy is still running when this returns. The destination
/// is consumed and closed on return; the client is usually passed by
/// mutable reference so its owner can close it.
pub async fn relay_tcp<A, B>(client: A, remote: B) -> Result<RelayStats, RelayError>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut remote_read, mut remote_write) = tokio::io::split(remote);

    let upstream = Box::pin(copy_half(
        &mut client_read,
        &mut remote_write,
        Direction::Upstream,
    ));
    let downstream = Box::pin(copy_half(
        &mut remote_read,
        &mut client_write,
        Direction::Downstream,
    ));

    let result = match future::select(upstream, downstream).await {
        Either::Left((Ok(up), downstream)) => Ok(RelayStats {
            upstream: up,
            downstream: downstream.await?,
        }),
        Either::Right((Ok(down), upstream)) => Ok(RelayStats {
            upstream: upstream.await?,
            downstream: down,
        }),
        Either::Left((Err(e), downstream)) => {
            drop(downstream);
            Err(e)
        }
        Either::Right((Err(e), upstream)) => {
            drop(upstream);
            Err(e)
        }
    };
    result
}

/// Copy one direction until EOF, then forward the half-close
async fn copy_half<R, W>(
    reader: &mut R,
    writer: &mut W,
    direction: Direction,
) -> Result<u64, RelayError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let bytes = tokio::io::copy(reader, writer)
        .await
        .map_err(|e| RelayError::new(direction, e))?;

    // The peer may already be gone; EOF was still clean on our side
    if let Err(e) = writer.shutdown().await {
        debug!("{} shutdown: {}", direction, e);
    }

    debug!("{} finished: {} bytes", direction, bytes);
    Ok(bytes)
}
