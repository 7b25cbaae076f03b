use crate::error::{MalformedKind, Result, TransportError};

/// The status line of a tunnel response: `Version SP Code SP Reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub code: u16,
}

impl StatusLine {
    /// Parse a status line (without its CRLF).
    ///
    /// The line must split on single spaces into exactly three tokens. The
    /// tunnel servers in the wild answer with one-word reasons (`OK`,
    /// `Unauthorized`), so anything else is treated as malformed.
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split(' ').collect();

        if parts.len() != 3 {
            return Err(TransportError::malformed(MalformedKind::InvalidStatusLine {
                tokens: parts.len(),
            }));
        }

        let code = parts[1]
            .parse()
            .map_err(|_| TransportError::malformed(MalformedKind::InvalidStatusCode))?;

        Ok(StatusLine { code })
    }
}

/// A scanned response head: status line plus the raw header lines.
///
/// Headers are only parsed on demand; the tunnel looks at a single one
/// (`WWW-Authenticate`, on a 401).
#[derive(Debug)]
pub struct ResponseHead<'a> {
    pub status: StatusLine,
    headers: &'a [u8],
}

impl<'a> ResponseHead<'a> {
    /// Parse a header block ending in `CRLFCRLF`.
    pub fn parse(block: &'a [u8]) -> Result<Self> {
        let line_end = block
            .windows(2)
            .position(|w| w == b"\r\n")
            .filter(|&end| end > 0)
            .ok_or_else(|| TransportError::malformed(MalformedKind::MissingStatusLine))?;

        let line = std::str::from_utf8(&block[..line_end]).map_err(|_| {
            TransportError::malformed(MalformedKind::InvalidStatusLine { tokens: 0 })
        })?;
        let status = StatusLine::parse(line)?;

        Ok(ResponseHead {
            status,
            headers: &block[line_end + 2..],
        })
    }

    /// Look up a header value by name (case-insensitive), trimmed.
    ///
    /// The only limit on the number of headers is the block itself, which
    /// the scanner already bounded.
    pub fn header(&self, name: &str) -> Result<Option<String>> {
        let lines = self.headers.split(|&b| b == b'\n').count();
        let mut headers = vec![httparse::EMPTY_HEADER; lines];
        match httparse::parse_headers(self.headers, &mut headers) {
            Ok(httparse::Status::Complete((_, parsed))) => Ok(parsed
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .map(|h| String::from_utf8_lossy(h.value).trim().to_string())),
            Ok(httparse::Status::Partial) | Err(_) => {
                Err(TransportError::malformed(MalformedKind::InvalidHeaders))
            }
        }
    }
}
