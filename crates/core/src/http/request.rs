use super::AUTHORIZATION_HEADER;

/// An HTTP/1.0 tunnel request head.
///
/// Serializes to the literal text sent on the wire:
///
/// ```text
/// POST /stream HTTP/1.0\r\n
/// x-sessioncookie: 3f2a9c0d1e\r\n
/// Content-Type: application/x-rtsp-tunnelled\r\n
/// Content-Length: 44\r\n
/// \r\n
/// ```
///
/// Headers are emitted in the order they were added. The body is not part
/// of the head; the command channel writes it separately.
#[must_use]
#[derive(Debug, Clone)]
pub struct TunnelRequest {
    pub method: &'static str,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl TunnelRequest {
    pub fn new(method: &'static str, path: &str) -> Self {
        TunnelRequest {
            method,
            path: path.to_string(),
            headers: Vec::new(),
        }
    }

    /// The long-lived data channel request.
    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    /// A command channel request.
    pub fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    pub fn header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds `Authorization` only when a value is present.
    pub fn authorization(self, value: Option<String>) -> Self {
        match value {
            Some(value) => self.header(AUTHORIZATION_HEADER, value),
            None => self,
        }
    }

    pub fn serialize(&self) -> String {
        let mut request = format!("{} {} HTTP/1.0\r\n", self.method, self.path);
        for (name, value) in &self.headers {
            request.push_str(&format!("{}: {}\r\n", name, value));
        }
        request.push_str("\r\n");
        request
    }
}
