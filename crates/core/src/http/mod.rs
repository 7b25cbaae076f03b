//! HTTP/1.0 plumbing for the RTSP-over-HTTP tunnel.
//!
//! The tunnel speaks just enough HTTP to get through proxies:
//!
//! ```text
//! client                                   server
//!   | GET /stream HTTP/1.0                    |   data channel, kept open
//!   | x-sessioncookie: 3f2a9c0d1e             |
//!   |---------------------------------------->|
//!   |<----------------------------------------|   HTTP/1.0 200 OK
//!   |<======= RTSP responses, RTP data =======|
//!   |                                         |
//!   | POST /stream HTTP/1.0                   |   command channel,
//!   | x-sessioncookie: 3f2a9c0d1e             |   one per write
//!   | Content-Type: application/x-rtsp-tunnelled
//!   | Content-Length: 44                      |
//!   |                                         |
//!   | T1BUSU9OUyAqIFJUU1AvMS4wDQpDU2VxOiAxDQoNCg==
//!   |---------------------------------------->|
//! ```
//!
//! - [`request`]: literal request text for both channels.
//! - [`scanner`]: bounded search for the end of the response header block.
//! - [`response`]: status line and header lookup on the scanned block.

pub mod request;
pub mod response;
pub mod scanner;

pub use request::TunnelRequest;
pub use response::{ResponseHead, StatusLine};
pub use scanner::{HeaderBuffer, find_boundary, scan_headers};

/// Header correlating the GET and POST connections of one tunnel.
pub const SESSION_COOKIE_HEADER: &str = "x-sessioncookie";

/// Content type of every command-channel POST body.
pub const TUNNEL_CONTENT_TYPE: &str = "application/x-rtsp-tunnelled";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const WWW_AUTHENTICATE_HEADER: &str = "WWW-Authenticate";

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNAUTHORIZED: u16 = 401;
