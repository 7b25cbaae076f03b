use base64::prelude::{BASE64_STANDARD, Engine as _};

use super::{AuthError, Authenticator, Credentials};

/// HTTP Basic authentication (RFC 7617).
///
/// The value is the same for every request, so the counter, path, method
/// and body are ignored.
pub struct BasicAuthenticator {
    value: String,
}

impl BasicAuthenticator {
    pub fn new(credentials: &Credentials) -> Self {
        let token = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.username, credentials.password
        ));
        Self {
            value: format!("Basic {token}"),
        }
    }
}

impl Authenticator for BasicAuthenticator {
    fn response(
        &mut self,
        _counter: u32,
        _path: &str,
        _method: &str,
        _body: &[u8],
    ) -> Result<String, AuthError> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_user_and_password() {
        let mut auth = BasicAuthenticator::new(&Credentials::new("Aladdin", "open sesame"));
        assert_eq!(
            auth.response(7, "/", "POST", b"x").unwrap(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }
}
