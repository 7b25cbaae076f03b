//! The data channel stream handed to the RTSP layer.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// A connection that first replays bytes read ahead of the caller.
///
/// The tunnel handshake reads the GET response into a fixed buffer, and
/// the server may already have sent RTSP bytes behind the header block.
/// Those bytes are served first, then reads fall through to the socket.
/// Writes always go straight to the socket.
#[derive(Debug)]
pub struct DataStream<S> {
    inner: S,
    prebuffer: Bytes,
}

impl<S> DataStream<S> {
    pub fn new(inner: S, prebuffer: impl Into<Bytes>) -> Self {
        Self {
            inner,
            prebuffer: prebuffer.into(),
        }
    }

    /// Bytes still waiting in the replay buffer.
    pub fn buffered(&self) -> &[u8] {
        &self.prebuffer
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for DataStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if this.prebuffer.has_remaining() {
            let n = this.prebuffer.len().min(buf.remaining());
            buf.put_slice(&this.prebuffer[..n]);
            this.prebuffer.advance(n);
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for DataStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[tokio::test]
    async fn replays_prebuffer_then_socket() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut stream = DataStream::new(client, b"RTSP/1.0".to_vec());
        server.write_all(b" 200 OK").await.unwrap();

        let mut first = [0u8; 4];
        stream.read_exact(&mut first).await.unwrap();
        assert_eq!(&first, b"RTSP");
        assert_eq!(stream.buffered(), b"/1.0");

        let mut rest = [0u8; 11];
        stream.read_exact(&mut rest).await.unwrap();
        assert_eq!(&rest, b"/1.0 200 OK");
        assert!(stream.buffered().is_empty());
    }

    #[tokio::test]
    async fn writes_bypass_prebuffer() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut stream = DataStream::new(client, b"pending".to_vec());
        stream.write_all(b"ping").await.unwrap();

        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
        assert_eq!(stream.buffered(), b"pending");
    }
}
