use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::{Connector, RtspTransport, TcpConnector};
use crate::error::{Result, TransportError};
use crate::util::cancellable;

/// Direct RTSP over a single TCP connection (RFC 2326 §10.12 style).
///
/// Used when nothing between client and server gets in the way. Both
/// directions share the socket, so writes are plain socket writes.
pub struct TcpTransport<C: Connector = TcpConnector> {
    connector: C,
    host: String,
    port: u16,
    stream: Option<C::Stream>,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_connector(TcpConnector, host, port)
    }
}

impl<C: Connector> TcpTransport<C> {
    pub fn with_connector(connector: C, host: impl Into<String>, port: u16) -> Self {
        Self {
            connector,
            host: host.into(),
            port,
            stream: None,
        }
    }
}

impl<C: Connector> RtspTransport for TcpTransport<C> {
    type Stream = C::Stream;

    async fn connect(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.dispose();
        let stream = cancellable(cancel, self.connector.connect(&self.host, self.port)).await?;
        tracing::debug!(host = %self.host, port = self.port, "direct transport connected");
        self.stream = Some(stream);
        Ok(())
    }

    fn stream(&mut self) -> Result<&mut C::Stream> {
        self.stream.as_mut().ok_or(TransportError::InvalidState)
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn read(&mut self, buf: &mut [u8], cancel: &CancellationToken) -> Result<usize> {
        let stream = self.stream()?;
        cancellable(cancel, stream.read(buf)).await
    }

    async fn read_exact(&mut self, buf: &mut [u8], cancel: &CancellationToken) -> Result<()> {
        let stream = self.stream()?;
        cancellable(cancel, stream.read_exact(buf)).await?;
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8], cancel: &CancellationToken) -> Result<()> {
        let stream = self.stream()?;
        cancellable(cancel, async {
            stream.write_all(bytes).await?;
            stream.flush().await
        })
        .await
    }

    fn dispose(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(host = %self.host, port = self.port, "direct transport disposed");
        }
    }
}
