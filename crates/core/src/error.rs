//! Error types for the RTSP transport library.

use std::fmt;

use crate::auth::AuthError;

/// Errors that can occur while establishing or using an RTSP transport.
///
/// Variants map to specific failure modes of the tunnel:
///
/// - **Socket**: [`Io`](Self::Io): connect, read or write failures.
/// - **Response**: [`MalformedResponse`](Self::MalformedResponse),
///   [`UnexpectedStatus`](Self::UnexpectedStatus),
///   [`ResponseTooLarge`](Self::ResponseTooLarge),
///   [`PrematureClose`](Self::PrematureClose).
/// - **Usage**: [`InvalidState`](Self::InvalidState),
///   [`Cancelled`](Self::Cancelled), [`InvalidTarget`](Self::InvalidTarget).
/// - **Authentication**: [`Auth`](Self::Auth),
///   [`CounterExhausted`](Self::CounterExhausted).
///
/// None of these are retried internally, apart from the single
/// authenticated GET retry during the tunnel handshake.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP response could not be understood.
    #[error("malformed HTTP response: {kind}")]
    MalformedResponse { kind: MalformedKind },

    /// The server answered with a status the handshake does not accept.
    #[error("unexpected HTTP status code: {code}")]
    UnexpectedStatus { code: u16 },

    /// The header buffer filled up before the end of the header block.
    #[error("HTTP response headers are too large (more than {capacity_kb} KB)")]
    ResponseTooLarge { capacity_kb: usize },

    /// The peer closed the connection while a response was still expected.
    #[error("connection closed before the response was complete")]
    PrematureClose,

    /// The data stream was requested before a successful `connect`.
    #[error("transport is not connected")]
    InvalidState,

    /// The cancellation token fired while an operation was suspended.
    #[error("operation cancelled")]
    Cancelled,

    /// Authenticator construction or response computation failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The request counter would wrap around.
    #[error("request counter exhausted")]
    CounterExhausted,

    /// The target URL cannot be used to address the server.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

/// Specific kind of malformed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// No status line before the end of the header block.
    MissingStatusLine,
    /// Status line did not split into `Version Code Reason`.
    InvalidStatusLine { tokens: usize },
    /// The status code token is not a number.
    InvalidStatusCode,
    /// A 401 arrived without a usable `WWW-Authenticate` header.
    MissingChallenge,
    /// The header block is not valid HTTP.
    InvalidHeaders,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStatusLine => write!(f, "missing status line"),
            Self::InvalidStatusLine { tokens } => {
                write!(f, "status line has {tokens} tokens, expected 3")
            }
            Self::InvalidStatusCode => write!(f, "invalid status code"),
            Self::MissingChallenge => write!(f, "missing WWW-Authenticate header"),
            Self::InvalidHeaders => write!(f, "invalid header block"),
        }
    }
}

impl TransportError {
    pub(crate) fn malformed(kind: MalformedKind) -> Self {
        Self::MalformedResponse { kind }
    }
}

/// Convenience alias for `Result<T, TransportError>`.
pub type Result<T> = std::result::Result<T, TransportError>;
