pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
mod util;

pub use auth::{Authenticator, AuthenticatorFactory, Credentials, SchemeAuthenticatorFactory};
pub use config::{TunnelConfig, TunnelTarget, credentials_from_url};
pub use error::{MalformedKind, Result, TransportError};
pub use transport::{
    Connector, DataStream, HttpTunnelTransport, RtspTransport, TcpConnector, TcpTransport,
};
pub use tokio_util::sync::CancellationToken;
