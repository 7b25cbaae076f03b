use std::borrow::Cow;

use super::{AuthError, Authenticator, Credentials};

/// HTTP Digest authentication (RFC 7616) on top of `digest_auth`.
///
/// The session's request counter is used as the nonce count (`nc`), so the
/// value the server sees is exactly the counter the tunnel passed in and is
/// never reused across the data and command channels.
pub struct DigestAuthenticator {
    credentials: Credentials,
    challenge: digest_auth::WwwAuthenticateHeader,
}

impl DigestAuthenticator {
    pub fn new(credentials: &Credentials, challenge: &str) -> Result<Self, AuthError> {
        let challenge = digest_auth::WwwAuthenticateHeader::parse(challenge)
            .map_err(|e| AuthError::InvalidChallenge(format!("{challenge:?}: {e}")))?;
        Ok(Self {
            credentials: credentials.clone(),
            challenge,
        })
    }
}

impl Authenticator for DigestAuthenticator {
    fn response(
        &mut self,
        counter: u32,
        path: &str,
        method: &str,
        body: &[u8],
    ) -> Result<String, AuthError> {
        // `respond` bumps nc before using it.
        self.challenge.nc = counter.saturating_sub(1);

        let body = (!body.is_empty()).then_some(body);
        let ctx = digest_auth::AuthContext::new_with_method(
            &self.credentials.username,
            &self.credentials.password,
            path,
            body,
            digest_auth::HttpMethod(Cow::Borrowed(method)),
        );
        let authorization = self
            .challenge
            .respond(&ctx)
            .map_err(|e| AuthError::Respond(e.to_string()))?;
        Ok(authorization.to_string())
    }
}
