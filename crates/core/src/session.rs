//! Tunnel session state shared by the data and command channels.
//!
//! A tunnel is one logical RTSP connection made of many HTTP connections.
//! What ties them together lives here:
//!
//! - The **session cookie**, sent as `x-sessioncookie` on the GET and on
//!   every POST so the server can pair them. Fixed for a handshake attempt.
//! - The **request counter**, advanced once per authorized request on
//!   either channel. Digest authentication uses it as the nonce count, so
//!   it has to be monotonic across the whole session, not per connection.
//! - The **authenticator**, installed once after the first 401 and kept
//!   for the rest of the session.
//!
//! The state is owned by a single transport and mutated only through
//! `&mut self`, which is what enforces the single-writer rule.

use std::fmt;

use rand::RngExt;

use crate::auth::Authenticator;
use crate::error::{Result, TransportError};

/// Length of the `x-sessioncookie` value.
pub const COOKIE_LEN: usize = 10;

pub struct TunnelSession {
    cookie: String,
    counter: u32,
    authenticator: Option<Box<dyn Authenticator>>,
}

impl TunnelSession {
    pub fn new() -> Self {
        TunnelSession {
            cookie: generate_cookie(),
            counter: 0,
            authenticator: None,
        }
    }

    /// Start a new handshake attempt: counter back to zero, fresh cookie.
    ///
    /// The authenticator survives; it only ever goes from absent to present.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.cookie = generate_cookie();
        tracing::trace!(cookie = %self.cookie, "tunnel session reset");
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Counter value used by the most recent authorized request.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticator.is_some()
    }

    /// Install the authenticator negotiated from a challenge.
    ///
    /// Returns `false` and drops `authenticator` if one is already set.
    pub fn install_authenticator(&mut self, authenticator: Box<dyn Authenticator>) -> bool {
        if self.authenticator.is_some() {
            return false;
        }
        self.authenticator = Some(authenticator);
        true
    }

    /// Compute the `Authorization` value for the next request, if any.
    ///
    /// The counter is advanced before the authenticator is called, so the
    /// value it signs is the value this request consumes.
    pub fn authorization(
        &mut self,
        path: &str,
        method: &str,
        body: &[u8],
    ) -> Result<Option<String>> {
        let Some(authenticator) = self.authenticator.as_mut() else {
            return Ok(None);
        };

        self.counter = self
            .counter
            .checked_add(1)
            .ok_or(TransportError::CounterExhausted)?;
        let value = authenticator.response(self.counter, path, method, body)?;
        Ok(Some(value))
    }
}

impl Default for TunnelSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TunnelSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelSession")
            .field("cookie", &self.cookie)
            .field("counter", &self.counter)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// 10 hex digits of a random 128-bit value.
fn generate_cookie() -> String {
    let value = rand::rng().random::<u128>();
    let mut cookie = format!("{:032x}", value);
    cookie.truncate(COOKIE_LEN);
    cookie
}
