//! SOCKS4 request parser
//!
//! Parses SOCKS4 CONNECT requests from the client.

use crate::error::HandshakeError;
use crate::socks::consts::*;
use crate::socks::types::{Request, SocksCommand};
use std::io;
use std::net::Ipv4Addr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Read a SOCKS4 request from the stream
///
/// Fields are read in wire order and validated as soon as they arrive, so
/// a client speaking another protocol is refused without waiting for bytes
/// it will never send. The user id has no length limit: a client that never
/// sends the terminating null keeps this future pending.
///
/// Bytes the client sends after the terminator stay in the reader's buffer
/// and are relayed once the session starts.
pub async fn read_request<R>(stream: &mut R) -> Result<Request, HandshakeError>
where
    R: AsyncBufRead + Unpin,
{
    let version = stream.read_u8().await?;
    if version != SOCKS4_VERSION {
        return Err(HandshakeError::UnsupportedVersion(version));
    }

    let cmd_byte = stream.read_u8().await?;
    let command = match SocksCommand::from_byte(cmd_byte) {
        Some(SocksCommand::Connect) => SocksCommand::Connect,
        _ => return Err(HandshakeError::CommandNotSupported(cmd_byte)),
    };

    let port = stream.read_u16().await?;

    let mut addr = [0u8; 4];
    stream.read_exact(&mut addr).await?;

    let mut user_id = Vec::new();
    stream
        .read_until(SOCKS4_USERID_TERMINATOR, &mut user_id)
        .await?;
    if user_id.last() != Some(&SOCKS4_USERID_TERMINATOR) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream closed before user id terminator",
        )
        .into());
    }
    user_id.pop();

    Ok(Request {
        version,
        command,
        port,
        ip: Ipv4Addr::from(addr),
        user_id: String::from_utf8_lossy(&user_id).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_request_connect() {
        let data: &[u8] = &[4, 1, 0, 80, 93, 184, 216, 34, b'r', b'o', b'o', b't', 0];
        let mut stream = data;

        let req = read_request(&mut stream).await.unwrap();
        assert_eq!(req.version, 4);
        assert_eq!(req.command, SocksCommand::Connect);
        assert_eq!(req.port, 80);
        assert_eq!(req.ip, Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(req.user_id, "root");
        assert!(stream.is_empty());
    }

    #[tokio::test]
    async fn test_read_request_empty_user_id() {
        let data: &[u8] = &[4, 1, 0x1F, 0x90, 127, 0, 0, 1, 0];
        let mut stream = data;

        let req = read_request(&mut stream).await.unwrap();
        assert_eq!(req.port, 8080);
        assert_eq!(req.user_id, "");
    }

    #[tokio::test]
    async fn test_read_request_leaves_trailing_data() {
        let data: &[u8] = &[4, 1, 0, 80, 10, 0, 0, 1, b'u', 0, b'G', b'E', b'T'];
        let mut stream = data;

        read_request(&mut stream).await.unwrap();
        assert_eq!(stream, b"GET");
    }

    #[tokio::test]
    async fn test_read_request_wrong_version() {
        let data: &[u8] = &[5, 1, 0];
        let mut stream = data;

        let err = read_request(&mut stream).await.unwrap_err();
        assert!(matches!(err, HandshakeError::UnsupportedVersion(5)));
        // Nothing past the version byte is consumed
        assert_eq!(stream, &[1, 0]);
    }

    #[tokio::test]
    async fn test_read_request_bind_rejected() {
        let data: &[u8] = &[4, 2, 0, 80, 10, 0, 0, 1, 0];
        let mut stream = data;

        let err = read_request(&mut stream).await.unwrap_err();
        assert!(matches!(err, HandshakeError::CommandNotSupported(2)));
    }

    #[tokio::test]
    async fn test_read_request_unknown_command() {
        let data: &[u8] = &[4, 9];
        let mut stream = data;

        let err = read_request(&mut stream).await.unwrap_err();
        assert!(matches!(err, HandshakeError::CommandNotSupported(9)));
    }

    #[tokio::test]
    async fn test_read_request_truncated_header() {
        let data: &[u8] = &[4, 1, 0, 80, 10, 0];
        let mut stream = data;

        let err = read_request(&mut stream).await.unwrap_err();
        match err {
            HandshakeError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_request_unterminated_user_id() {
        let data: &[u8] = &[4, 1, 0, 80, 10, 0, 0, 1, b'r', b'o'];
        let mut stream = data;

        let err = read_request(&mut stream).await.unwrap_err();
        match err {
            HandshakeError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_request_empty_stream() {
        let data: &[u8] = &[];
        let mut stream = data;

        assert!(matches!(
            read_request(&mut stream).await,
            Err(HandshakeError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_read_request_non_utf8_user_id() {
        let data: &[u8] = &[4, 1, 0, 80, 10, 0, 0, 1, 0xFF, 0xFE, 0];
        let mut stream = data;

        let req = read_request(&mut stream).await.unwrap();
        assert_eq!(req.user_id.chars().count(), 2);
    }
}
