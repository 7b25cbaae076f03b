use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TransportError};
use crate::util::cancellable;

/// Marker between the HTTP header block and the body.
pub const BOUNDARY: &[u8] = b"\r\n\r\n";

/// Fixed-capacity buffer for one response header block.
///
/// Allocated once per handshake attempt and never grown: a server that
/// keeps sending header bytes runs into [`TransportError::ResponseTooLarge`]
/// instead of into unbounded allocation.
pub struct HeaderBuffer {
    buf: Box<[u8]>,
    filled: usize,
    header_len: Option<usize>,
}

impl HeaderBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            filled: 0,
            header_len: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Every byte read so far.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Status line and headers, including the trailing boundary marker.
    ///
    /// Empty until [`scan_headers`] has located the marker.
    pub fn head(&self) -> &[u8] {
        &self.buf[..self.header_len.unwrap_or(0)]
    }

    /// Bytes that arrived after the boundary marker in the same reads.
    pub fn remainder(&self) -> &[u8] {
        match self.header_len {
            Some(len) => &self.buf[len..self.filled],
            None => &[],
        }
    }

    fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }
}

/// Returns the offset just past the first `CRLFCRLF` in `bytes`.
pub fn find_boundary(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(BOUNDARY.len())
        .position(|window| window == BOUNDARY)
        .map(|pos| pos + BOUNDARY.len())
}

/// Reads from `stream` into `buffer` until the header block is complete.
///
/// The whole filled region is searched after every read, so a marker split
/// across two reads is still found. Returns the number of bytes filled,
/// which may include the start of the body.
///
/// Fails with [`TransportError::PrematureClose`] if a read returns zero
/// bytes and with [`TransportError::ResponseTooLarge`] if the buffer fills
/// up before the marker shows up.
pub async fn scan_headers<R>(
    stream: &mut R,
    buffer: &mut HeaderBuffer,
    cancel: &CancellationToken,
) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    loop {
        if buffer.is_full() {
            return Err(TransportError::ResponseTooLarge {
                capacity_kb: buffer.capacity() / 1024,
            });
        }

        let start = buffer.filled;
        let n = cancellable(cancel, stream.read(&mut buffer.buf[start..])).await?;
        if n == 0 {
            return Err(TransportError::PrematureClose);
        }
        buffer.filled += n;
        tracing::trace!(read = n, filled = buffer.filled, "scanning response headers");

        if let Some(len) = find_boundary(buffer.filled()) {
            buffer.header_len = Some(len);
            return Ok(buffer.filled);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;

    /// Yields exactly one chunk per read.
    struct Chunked {
        chunks: VecDeque<Vec<u8>>,
    }

    impl Chunked {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            }
        }
    }

    impl AsyncRead for Chunked {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if let Some(mut chunk) = self.chunks.pop_front() {
                let n = chunk.len().min(buf.remaining());
                buf.put_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.chunks.push_front(chunk.split_off(n));
                }
            }
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn boundary_offsets() {
        assert_eq!(find_boundary(b"HTTP/1.0 200 OK\r\n\r\n"), Some(19));
        assert_eq!(find_boundary(b"HTTP/1.0 200 OK\r\n\r\nbody"), Some(19));
        assert_eq!(find_boundary(b"HTTP/1.0 200 OK\r\n"), None);
        assert_eq!(find_boundary(b"\r\n\r"), None);
    }

    #[tokio::test]
    async fn single_read() {
        let mut stream = Chunked::new(&[b"HTTP/1.0 200 OK\r\nA: b\r\n\r\n"]);
        let mut buffer = HeaderBuffer::with_capacity(1024);
        let filled = scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(filled, 25);
        assert_eq!(buffer.head(), b"HTTP/1.0 200 OK\r\nA: b\r\n\r\n");
        assert!(buffer.remainder().is_empty());
    }

    #[tokio::test]
    async fn marker_split_across_reads() {
        let mut stream = Chunked::new(&[b"HTTP/1.0 200 OK\r\n\r", b"\nRTSP"]);
        let mut buffer = HeaderBuffer::with_capacity(1024);
        let filled = scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(filled, 23);
        assert_eq!(buffer.head(), b"HTTP/1.0 200 OK\r\n\r\n");
        assert_eq!(buffer.remainder(), b"RTSP");
    }

    #[tokio::test]
    async fn marker_split_byte_by_byte() {
        let mut stream = Chunked::new(&[b"HTTP/1.0 200 OK", b"\r", b"\n", b"\r", b"\n"]);
        let mut buffer = HeaderBuffer::with_capacity(64);
        let filled = scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(filled, 19);
    }

    #[tokio::test]
    async fn full_buffer_without_marker() {
        let junk = vec![b'a'; 4096];
        let mut stream = Chunked::new(&[&junk[..1500], &junk[1500..]]);
        let mut buffer = HeaderBuffer::with_capacity(2048);
        let err = scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ResponseTooLarge { capacity_kb: 2 }));
        assert_eq!(buffer.filled().len(), 2048);
        assert!(buffer.head().is_empty());
    }

    #[tokio::test]
    async fn marker_in_last_byte_of_buffer() {
        let mut stream = Chunked::new(&[b"HTTP/1.0 200 OK\r\n\r\n"]);
        let mut buffer = HeaderBuffer::with_capacity(19);
        assert_eq!(
            scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
                .await
                .unwrap(),
            19
        );
    }

    #[tokio::test]
    async fn close_before_marker() {
        let mut stream = Chunked::new(&[b"HTTP/1.0 200 OK\r\n"]);
        let mut buffer = HeaderBuffer::with_capacity(1024);
        let err = scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::PrematureClose));
    }

    #[tokio::test]
    async fn close_before_any_bytes() {
        let mut stream = Chunked::new(&[]);
        let mut buffer = HeaderBuffer::with_capacity(1024);
        let err = scan_headers(&mut stream, &mut buffer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::PrematureClose));
    }
}
