//! SOCKS4 reply builder
//!
//! Constructs SOCKS4 reply messages.

use crate::error::ReplyCode;
use crate::socks::consts::*;
use bytes::{BufMut, BytesMut};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A SOCKS4 reply
///
/// ```text
/// +----+----+----+----+----+----+----+----+
/// | VN | CD | DSTPORT |      DSTIP        |
/// +----+----+----+----+----+----+----+----+
///   1    1      2              4
/// ```
///
/// VN is always 0. DSTPORT and DSTIP are written as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Status code
    pub code: ReplyCode,
}

impl Reply {
    /// Create a reply with the given status
    pub fn new(code: ReplyCode) -> Self {
        Reply { code }
    }

    /// Write the reply into a buffer
    pub fn write_to_buf<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(SOCKS4_REPLY_VERSION);
        buf.put_u8(self.code.into());
        buf.put_u16(0);
        buf.put_u32(0);
    }
}

/// Build and send a SOCKS4 reply
///
/// The reply is always exactly eight bytes and is flushed before returning.
pub async fn build_reply<S>(stream: &mut S, code: ReplyCode) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(SOCKS4_REPLY_LEN);
    Reply::new(code).write_to_buf(&mut buf);

    stream.write_all(&buf).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_bytes_granted() {
        let mut buf = BytesMut::new();
        Reply::new(ReplyCode::Granted).write_to_buf(&mut buf);
        assert_eq!(&buf[..], &[0, 90, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_reply_length_is_fixed() {
        for code in [
            ReplyCode::Granted,
            ReplyCode::Rejected,
            ReplyCode::NoIdentd,
            ReplyCode::IdentdFailed,
        ] {
            let mut buf = BytesMut::new();
            Reply::new(code).write_to_buf(&mut buf);
            assert_eq!(buf.len(), SOCKS4_REPLY_LEN);
            assert_eq!(buf[1], u8::from(code));
        }
    }

    #[tokio::test]
    async fn test_build_reply_async() {
        let mut buffer = Vec::new();
        build_reply(&mut buffer, ReplyCode::Rejected).await.unwrap();
        assert_eq!(buffer, vec![0, 91, 0, 0, 0, 0, 0, 0]);
    }
}
