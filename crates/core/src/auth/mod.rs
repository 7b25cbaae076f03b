//! Authentication adapters for tunnel requests (RFC 7617, RFC 7616).
//!
//! The tunnel treats authentication as an opaque capability. When the
//! server challenges the first `GET` with `401 Unauthorized`, the
//! [`AuthenticatorFactory`] turns the credentials and the raw
//! `WWW-Authenticate` value into an [`Authenticator`]. From then on every
//! request on either channel asks it for an `Authorization` value:
//!
//! ```text
//! factory.create(credentials, challenge) -> authenticator
//! authenticator.response(counter, path, method, body) -> header value
//! ```
//!
//! The counter is the session's request counter. Schemes with replay
//! protection (Digest's `nc`) must use it as given; schemes without it
//! (Basic) ignore it.

mod basic;
mod digest;

pub use basic::BasicAuthenticator;
pub use digest::DigestAuthenticator;

use std::fmt;

/// Errors raised by authentication adapters.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The challenge names a scheme no adapter handles.
    #[error("unsupported authentication scheme: {0}")]
    UnsupportedScheme(String),

    /// The challenge could not be parsed.
    #[error("invalid authentication challenge: {0}")]
    InvalidChallenge(String),

    /// The adapter failed to compute a response.
    #[error("failed to compute authorization: {0}")]
    Respond(String),
}

/// Username and password supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Computes `Authorization` header values for outgoing requests.
pub trait Authenticator: Send {
    /// Returns the header value (without the `Authorization: ` prefix) for
    /// a request identified by `counter`, `path` and `method`, carrying the
    /// raw, pre-encoding `body`.
    fn response(
        &mut self,
        counter: u32,
        path: &str,
        method: &str,
        body: &[u8],
    ) -> Result<String, AuthError>;
}

/// Builds an [`Authenticator`] from a `WWW-Authenticate` challenge.
pub trait AuthenticatorFactory: Send + Sync {
    fn create(
        &self,
        credentials: &Credentials,
        challenge: &str,
    ) -> Result<Box<dyn Authenticator>, AuthError>;
}

/// Default factory: picks Basic or Digest from the challenge scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeAuthenticatorFactory;

impl AuthenticatorFactory for SchemeAuthenticatorFactory {
    fn create(
        &self,
        credentials: &Credentials,
        challenge: &str,
    ) -> Result<Box<dyn Authenticator>, AuthError> {
        let challenge = challenge.trim();
        let scheme = challenge
            .split_whitespace()
            .next()
            .ok_or_else(|| AuthError::InvalidChallenge(challenge.to_string()))?;

        if scheme.eq_ignore_ascii_case("basic") {
            Ok(Box::new(BasicAuthenticator::new(credentials)))
        } else if scheme.eq_ignore_ascii_case("digest") {
            Ok(Box::new(DigestAuthenticator::new(credentials, challenge)?))
        } else {
            Err(AuthError::UnsupportedScheme(scheme.to_string()))
        }
    }
}
