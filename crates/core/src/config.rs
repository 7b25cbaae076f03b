//! Tunnel configuration and target addressing.

use url::{Host, Url};

use crate::auth::Credentials;
use crate::error::{Result, TransportError};

/// Standard HTTP port, used when the target URL has none.
pub const DEFAULT_TUNNEL_PORT: u16 = 80;

/// Default header buffer capacity, in KB.
pub const DEFAULT_HEADER_BUFFER_KB: usize = 8;

/// The initial GET plus one authenticated retry.
pub const MAX_HANDSHAKE_ATTEMPTS: usize = 2;

/// Tunnel tuning knobs.
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    /// Capacity of the response header buffer, in KB. A response whose
    /// header block does not fit fails with `ResponseTooLarge`. Values
    /// below 1 are raised to 1: the buffer always holds at least 1 KB.
    pub header_buffer_kb: usize,
    /// Port used when the target does not name one.
    pub default_port: u16,
    /// GET attempts per `connect`. Clamped to `1..=2`: a challenge can be
    /// answered at most once.
    pub max_handshake_attempts: usize,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            header_buffer_kb: DEFAULT_HEADER_BUFFER_KB,
            default_port: DEFAULT_TUNNEL_PORT,
            max_handshake_attempts: MAX_HANDSHAKE_ATTEMPTS,
        }
    }
}

impl TunnelConfig {
    /// Header buffer size in bytes, never less than 1 KB.
    pub fn header_buffer_capacity(&self) -> usize {
        self.header_buffer_kb.max(1) * 1024
    }

    pub fn handshake_attempts(&self) -> usize {
        self.max_handshake_attempts.clamp(1, MAX_HANDSHAKE_ATTEMPTS)
    }
}

/// Where the tunnel connects and which path it requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelTarget {
    pub host: String,
    pub port: u16,
    /// Path and query, sent verbatim in the request line.
    pub path: String,
}

impl TunnelTarget {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    /// Derive a target from an `rtsp://` or `http://` URL.
    pub fn from_url(url: &Url, default_port: u16) -> Result<Self> {
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(TransportError::InvalidTarget(format!("{url} has no host"))),
        };

        let mut path = url.path().to_string();
        if path.is_empty() {
            path.push('/');
        }
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            host,
            port: url.port().unwrap_or(default_port),
            path,
        })
    }

    pub fn parse(url: &str, default_port: u16) -> Result<Self> {
        let url =
            Url::parse(url).map_err(|e| TransportError::InvalidTarget(format!("{url}: {e}")))?;
        Self::from_url(&url, default_port)
    }
}

/// Credentials embedded in the URL's userinfo, if any.
pub fn credentials_from_url(url: &Url) -> Option<Credentials> {
    if url.username().is_empty() {
        return None;
    }
    Some(Credentials::new(
        url.username(),
        url.password().unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_when_missing() {
        let target = TunnelTarget::parse("rtsp://camera.local/live", DEFAULT_TUNNEL_PORT).unwrap();
        assert_eq!(target, TunnelTarget::new("camera.local", 80, "/live"));
    }

    #[test]
    fn explicit_port_and_query() {
        let target = TunnelTarget::parse("http://10.0.0.5:8080/cam?ch=1&sub=0", 80).unwrap();
        assert_eq!(target.host, "10.0.0.5");
        assert_eq!(target.port, 8080);
        assert_eq!(target.path, "/cam?ch=1&sub=0");
    }

    #[test]
    fn ipv6_host_without_brackets() {
        let target = TunnelTarget::parse("rtsp://[::1]:8554/", 80).unwrap();
        assert_eq!(target.host, "::1");
        assert_eq!(target.path, "/");
    }

    #[test]
    fn url_without_host() {
        assert!(matches!(
            TunnelTarget::parse("rtsp:live", 80),
            Err(TransportError::InvalidTarget(_))
        ));
    }

    #[test]
    fn userinfo_credentials() {
        let url = Url::parse("rtsp://admin:pw@camera.local/live").unwrap();
        assert_eq!(
            credentials_from_url(&url),
            Some(Credentials::new("admin", "pw"))
        );
        assert_eq!(
            credentials_from_url(&Url::parse("rtsp://camera.local/").unwrap()),
            None
        );
    }

    #[test]
    fn header_buffer_has_a_floor() {
        let mut config = TunnelConfig::default();
        assert_eq!(config.header_buffer_capacity(), 8 * 1024);
        config.header_buffer_kb = 0;
        assert_eq!(config.header_buffer_capacity(), 1024);
    }

    #[test]
    fn attempts_are_clamped() {
        let mut config = TunnelConfig::default();
        assert_eq!(config.handshake_attempts(), 2);
        config.max_handshake_attempts = 10;
        assert_eq!(config.handshake_attempts(), 2);
        config.max_handshake_attempts = 0;
        assert_eq!(config.handshake_attempts(), 1);
    }
}
