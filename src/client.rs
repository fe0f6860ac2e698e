//! The [`PublicClient`]: client identity, token endpoint, and the shared
//! token-request builder used by every grant.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::{
    grant::{
        authorization_code::AuthorizationCodeGrant, client_credentials::ClientCredentialsGrant,
        refresh::RefreshGrant,
    },
    query,
};

/// The default per-request timeout applied to token endpoint calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while constructing or configuring a [`PublicClient`].
///
/// These are programmer errors: a missing client id, an unparseable
/// endpoint, a non-absolute redirect path. They are raised immediately, at
/// construction time, before any socket or HTTP request is touched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("client id must not be empty")]
    EmptyClientId,

    #[error("no token endpoint was configured")]
    MissingTokenEndpoint,

    #[error("token endpoint {0:?} is not an absolute URI")]
    InvalidTokenEndpoint(String, #[source] url::ParseError),

    #[error("authorization endpoint {0:?} is not an absolute URI")]
    InvalidAuthorizationEndpoint(String, #[source] url::ParseError),

    #[error("redirect path {0:?} must begin with '/'")]
    InvalidRedirectPath(String),
}

/// Convenience alias scoped to this module's [`Error`], used by
/// [`crate::builder`].
pub type Result<T> = std::result::Result<T, Error>;

/// The character set used to encode `client_id:client_secret` before
/// base64-encoding it for HTTP Basic authentication.
///
/// RFC 6749 Appendix B only requires UTF-8 percent-encoding of the
/// credentials pair, and no caller of this crate has needed anything else,
/// so `Utf8` is intentionally the only variant today.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Charset {
    #[default]
    Utf8,
}

/// An immutable OAuth 2.0 client identity, bound to one token endpoint.
///
/// Never mutated after construction: [`PublicClient::with_request_timeout`]
/// returns a new instance rather than mutating `self`. Safe to share (and
/// `Clone`) across threads — it holds no interior mutability.
#[derive(Clone, Debug)]
pub struct PublicClient {
    client_id: String,
    token_endpoint: Url,
    request_timeout: Duration,
}

impl PublicClient {
    pub(crate) fn new(client_id: impl Into<String>, token_endpoint: &str) -> Result<Self> {
        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(Error::EmptyClientId);
        }

        let token_endpoint = Url::parse(token_endpoint)
            .map_err(|err| Error::InvalidTokenEndpoint(token_endpoint.to_string(), err))?;

        Ok(Self {
            client_id,
            token_endpoint,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// The client identifier sent as `client_id` on every request.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The token endpoint every grant posts its request to.
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// The per-request timeout applied to token endpoint calls.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns a new client with `timeout` applied to future token
    /// requests. Does not mutate `self`.
    pub fn with_request_timeout(&self, timeout: Duration) -> Self {
        Self {
            request_timeout: timeout,
            ..self.clone()
        }
    }

    /// Starts configuring an Authorization Code Grant (with PKCE) against
    /// `authorization_endpoint`.
    ///
    /// Generates a fresh [`crate::pkce::Pkce`] pair immediately; the grant
    /// is otherwise unconfigured until [`AuthorizationCodeGrant::authorize`]
    /// is called.
    pub fn authorization_code_grant(
        &self,
        authorization_endpoint: &str,
    ) -> Result<AuthorizationCodeGrant> {
        let authorization_endpoint = Url::parse(authorization_endpoint).map_err(|err| {
            Error::InvalidAuthorizationEndpoint(authorization_endpoint.to_string(), err)
        })?;

        Ok(AuthorizationCodeGrant::new(
            self.clone(),
            authorization_endpoint,
        ))
    }

    /// Builds a Client Credentials Grant, precomputing the `Authorization:
    /// Basic` header from `client_id` and `client_secret`.
    pub fn client_credentials_grant(
        &self,
        charset: Charset,
        client_secret: impl AsRef<str>,
    ) -> ClientCredentialsGrant {
        ClientCredentialsGrant::new(self.clone(), charset, client_secret.as_ref())
    }

    /// Builds a refresh token request for this client.
    pub fn refresh(&self, refresh_token: impl AsRef<str>, scopes: &[&str]) -> RefreshGrant {
        RefreshGrant::new(self.clone(), refresh_token.as_ref(), scopes)
    }

    /// Builds the shared token endpoint request: `POST` to
    /// [`Self::token_endpoint`], `Content-Type:
    /// application/x-www-form-urlencoded`, body built by [`query::build`].
    ///
    /// Internal to this crate; every grant's `authorize`/`refresh` calls
    /// this to get the request it then hands to the injected HTTP client.
    /// The per-request [`Self::request_timeout`] is not representable on
    /// `http::Request` directly — it is carried in the request's
    /// [`http::Extensions`] as a [`Duration`], for HTTP clients that want to
    /// honor it (most do, by reading it before dispatch).
    pub(crate) fn build_token_request(&self, params: &[(String, String)]) -> http::Request<String> {
        let body = query::build(params);

        let mut request = http::Request::builder()
            .method(http::Method::POST)
            .uri(self.token_endpoint.as_str())
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .expect("token endpoint request is always well-formed");

        request.extensions_mut().insert(self.request_timeout);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_client_id() {
        let err = PublicClient::new("", "https://example.com/token").unwrap_err();
        assert!(matches!(err, Error::EmptyClientId));
    }

    #[test]
    fn rejects_invalid_token_endpoint() {
        let err = PublicClient::new("client", "not a uri").unwrap_err();
        assert!(matches!(err, Error::InvalidTokenEndpoint(..)));
    }

    #[test]
    fn with_request_timeout_returns_new_instance() {
        let client = PublicClient::new("client", "https://example.com/token").unwrap();
        let slower = client.with_request_timeout(Duration::from_secs(60));
        assert_eq!(client.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(slower.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn build_token_request_has_expected_shape() {
        let client = PublicClient::new("client", "https://example.com/token").unwrap();
        let params = vec![("grant_type".to_string(), "refresh_token".to_string())];
        let request = client.build_token_request(&params);

        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.uri(), "https://example.com/token");
        assert_eq!(
            request.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.body(), "grant_type=refresh_token");
    }
}
