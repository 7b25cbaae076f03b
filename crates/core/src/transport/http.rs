use std::sync::Arc;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::{Connector, DataStream, RtspTransport, TcpConnector};
use crate::auth::{AuthenticatorFactory, Credentials, SchemeAuthenticatorFactory};
use crate::config::{TunnelConfig, TunnelTarget};
use crate::error::{MalformedKind, Result, TransportError};
use crate::http::{
    HeaderBuffer, ResponseHead, SESSION_COOKIE_HEADER, STATUS_OK, STATUS_UNAUTHORIZED,
    TUNNEL_CONTENT_TYPE, TunnelRequest, WWW_AUTHENTICATE_HEADER, scan_headers,
};
use crate::session::TunnelSession;
use crate::util::cancellable;

/// RTSP tunnelled over HTTP.
///
/// ## Handshake
///
/// ```text
/// Disconnected -> AwaitingResponse -> Connected            (200)
///                                  -> retry, authenticated (first 401 with credentials)
///                                  -> Failed               (anything else)
/// ```
///
/// `connect` opens the data channel and sends the `GET`. A `401` is
/// answered once: the challenge builds an authenticator, the connection is
/// dropped and the `GET` is repeated with an `Authorization` header. A
/// second `401` is an error. The attempt loop is bounded by
/// [`TunnelConfig::handshake_attempts`], never by server behaviour.
///
/// ## Writes
///
/// Each `write` opens a fresh command connection, sends one base64 `POST`
/// and closes it again. The server's reply, if any, arrives on the data
/// channel.
pub struct HttpTunnelTransport<C: Connector = TcpConnector> {
    connector: C,
    target: TunnelTarget,
    credentials: Option<Credentials>,
    auth_factory: Arc<dyn AuthenticatorFactory>,
    config: TunnelConfig,
    session: TunnelSession,
    data: Option<DataStream<C::Stream>>,
}

enum Handshake<S> {
    Connected(DataStream<S>),
    Challenged(String),
}

impl HttpTunnelTransport {
    pub fn new(target: TunnelTarget, credentials: Option<Credentials>) -> Self {
        Self::with_connector(TcpConnector, target, credentials, TunnelConfig::default())
    }
}

impl<C: Connector> HttpTunnelTransport<C> {
    pub fn with_connector(
        connector: C,
        target: TunnelTarget,
        credentials: Option<Credentials>,
        config: TunnelConfig,
    ) -> Self {
        Self {
            connector,
            target,
            credentials,
            auth_factory: Arc::new(SchemeAuthenticatorFactory),
            config,
            session: TunnelSession::new(),
            data: None,
        }
    }

    /// Replace the factory that turns challenges into authenticators.
    pub fn with_authenticator_factory(mut self, factory: Arc<dyn AuthenticatorFactory>) -> Self {
        self.auth_factory = factory;
        self
    }

    pub fn target(&self) -> &TunnelTarget {
        &self.target
    }

    pub fn session(&self) -> &TunnelSession {
        &self.session
    }

    fn compose_get(&mut self) -> Result<String> {
        let path = &self.target.path;
        let authorization = self.session.authorization(path, "GET", &[])?;
        Ok(TunnelRequest::get(path)
            .header(SESSION_COOKIE_HEADER, self.session.cookie())
            .authorization(authorization)
            .serialize())
    }

    /// Request head and base64 body for one command.
    fn compose_post(&mut self, bytes: &[u8]) -> Result<(String, String)> {
        let body = BASE64_STANDARD.encode(bytes);
        let path = &self.target.path;
        // Signed over the raw command, not the base64 text.
        let authorization = self.session.authorization(path, "POST", bytes)?;
        let head = TunnelRequest::post(path)
            .header(SESSION_COOKIE_HEADER, self.session.cookie())
            .header("Content-Type", TUNNEL_CONTENT_TYPE)
            .header("Content-Length", body.len())
            .authorization(authorization)
            .serialize();
        Ok((head, body))
    }

    /// One GET attempt on a fresh data connection.
    async fn handshake(
        &mut self,
        attempt: usize,
        cancel: &CancellationToken,
    ) -> Result<Handshake<C::Stream>> {
        let TunnelTarget { host, port, .. } = &self.target;
        let mut conn = cancellable(cancel, self.connector.connect(host, *port)).await?;

        let request = self.compose_get()?;
        tracing::debug!(
            attempt,
            host = %self.target.host,
            port = self.target.port,
            path = %self.target.path,
            cookie = %self.session.cookie(),
            authenticated = self.session.is_authenticated(),
            "sending tunnel GET"
        );
        cancellable(cancel, async {
            conn.write_all(request.as_bytes()).await?;
            conn.flush().await
        })
        .await?;

        let mut buffer = HeaderBuffer::with_capacity(self.config.header_buffer_capacity());
        scan_headers(&mut conn, &mut buffer, cancel).await?;
        let head = ResponseHead::parse(buffer.head())?;
        let code = head.status.code;
        tracing::debug!(attempt, status = code, "tunnel GET response");

        match code {
            STATUS_OK => Ok(Handshake::Connected(DataStream::new(
                conn,
                Bytes::copy_from_slice(buffer.remainder()),
            ))),
            STATUS_UNAUTHORIZED
                if self.credentials.is_some() && !self.session.is_authenticated() =>
            {
                let challenge = head
                    .header(WWW_AUTHENTICATE_HEADER)?
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| TransportError::malformed(MalformedKind::MissingChallenge))?;
                Ok(Handshake::Challenged(challenge))
            }
            code => Err(TransportError::UnexpectedStatus { code }),
        }
    }

    async fn send_command(
        &mut self,
        conn: &mut C::Stream,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (head, body) = self.compose_post(bytes)?;
        tracing::trace!(
            raw = bytes.len(),
            encoded = body.len(),
            counter = self.session.counter(),
            "sending tunnel POST"
        );
        cancellable(cancel, async {
            conn.write_all(head.as_bytes()).await?;
            conn.write_all(body.as_bytes()).await?;
            conn.flush().await?;
            conn.shutdown().await
        })
        .await
    }
}

impl<C: Connector> RtspTransport for HttpTunnelTransport<C> {
    type Stream = DataStream<C::Stream>;

    async fn connect(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.dispose();

        let attempts = self.config.handshake_attempts();
        for attempt in 1..=attempts {
            self.session.reset();

            match self.handshake(attempt, cancel).await? {
                Handshake::Connected(stream) => {
                    tracing::debug!(attempt, cookie = %self.session.cookie(), "tunnel connected");
                    self.data = Some(stream);
                    return Ok(());
                }
                Handshake::Challenged(challenge) if attempt < attempts => {
                    // The data connection from this attempt is already closed.
                    let credentials = self
                        .credentials
                        .as_ref()
                        .ok_or(TransportError::UnexpectedStatus {
                            code: STATUS_UNAUTHORIZED,
                        })?;
                    let authenticator = self.auth_factory.create(credentials, &challenge)?;
                    self.session.install_authenticator(authenticator);
                    tracing::debug!(attempt, "tunnel challenged, retrying with authorization");
                }
                Handshake::Challenged(_) => break,
            }
        }

        Err(TransportError::UnexpectedStatus {
            code: STATUS_UNAUTHORIZED,
        })
    }

    fn stream(&mut self) -> Result<&mut DataStream<C::Stream>> {
        self.data.as_mut().ok_or(TransportError::InvalidState)
    }

    fn is_connected(&self) -> bool {
        self.data.is_some()
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
        let mut conn = cancellable(
            cancel,
            self.connector.connect(&self.target.host, self.target.port),
        )
        .await?;

        let outcome = self.send_command(&mut conn, bytes, cancel).await;

        // The command connection never outlives this call.
        drop(conn);
        tracing::trace!(ok = outcome.is_ok(), "command channel released");
        outcome
    }

    fn dispose(&mut self) {
        if self.data.take().is_some() {
            tracing::debug!(cookie = %self.session.cookie(), "tunnel disposed");
        }
    }
}
