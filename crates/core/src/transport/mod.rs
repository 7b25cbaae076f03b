//! Byte transports for the RTSP client layer.
//!
//! RTSP needs one bidirectional byte channel to the server. Two variants
//! provide it behind the same [`RtspTransport`] contract:
//!
//! - **Direct** ([`tcp`]): one TCP connection carries both directions.
//!
//! - **HTTP tunnel** ([`http`]): for networks that only let outbound HTTP
//!   through. Server-to-client bytes arrive on a long-lived `GET`; each
//!   client-to-server write is a short-lived, base64-encoded `POST`.
//!
//! The variant is picked once at construction; the RTSP layer above only
//! sees the trait.
//!
//! ## Single writer
//!
//! Every method takes `&mut self`. The tunnel's session state (cookie,
//! request counter) is mutated without internal locking, so callers that
//! share a transport across tasks must serialize access themselves.
//!
//! ## Cancellation
//!
//! Every suspending call takes a [`CancellationToken`]. When it fires, the
//! pending connect/read/write is abandoned, the call returns
//! [`TransportError::Cancelled`](crate::TransportError::Cancelled) and any
//! connection opened for that call is closed.

pub mod http;
pub mod stream;
pub mod tcp;

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub use http::HttpTunnelTransport;
pub use stream::DataStream;
pub use tcp::TcpTransport;

/// The capability set every RTSP transport variant provides.
pub trait RtspTransport {
    /// The server-to-client byte stream handed to the RTSP layer.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Establish the transport. Replaces any previous connection.
    fn connect(&mut self, cancel: &CancellationToken) -> impl Future<Output = Result<()>> + Send;

    /// The connected stream, or `InvalidState` before a successful `connect`.
    fn stream(&mut self) -> Result<&mut Self::Stream>;

    fn is_connected(&self) -> bool;

    /// Read whatever is available; `Ok(0)` means the server closed.
    fn read(
        &mut self,
        buf: &mut [u8],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Fill `buf` completely or fail with `PrematureClose`.
    fn read_exact(
        &mut self,
        buf: &mut [u8],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Send `bytes` to the server.
    fn write(
        &mut self,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Release every open connection. Safe to call more than once.
    fn dispose(&mut self);
}

/// Opens the sockets transports run on.
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        tracing::trace!(host, port, local = ?stream.local_addr().ok(), "tcp connected");
        Ok(stream)
    }
}
