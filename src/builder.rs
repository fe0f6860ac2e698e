//! A fluent façade over [`PublicClient`] construction.
//!
//! [`PublicClient::new`] is deliberately `pub(crate)`: this module is the
//! only supported way to build one, so every caller reads the same
//! `client("id").with_token_endpoint(...)?.build()?` shape regardless of
//! which grant they end up using.

use std::time::Duration;

use crate::client::{self, PublicClient};

/// Starts building a [`PublicClient`] identified by `client_id`.
pub fn client(client_id: impl Into<String>) -> ClientBuilder {
    ClientBuilder {
        client_id: client_id.into(),
        token_endpoint: None,
        request_timeout: None,
    }
}

/// A [`PublicClient`] under construction.
///
/// Every `with_*` method consumes and returns `self`, so the builder chains
/// without an intermediate binding. [`Self::build`] performs the actual
/// validation: an empty client id or an unparseable endpoint is only ever
/// reported there.
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    client_id: String,
    token_endpoint: Option<String>,
    request_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Sets the token endpoint every grant built from this client will post
    /// its requests to.
    pub fn with_token_endpoint(mut self, uri: impl Into<String>) -> client::Result<Self> {
        self.token_endpoint = Some(uri.into());
        Ok(self)
    }

    /// Overrides the default per-request timeout ([`client::DEFAULT_REQUEST_TIMEOUT`]).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validates and builds the [`PublicClient`].
    ///
    /// Fails if the client id is empty, no token endpoint was given, or the
    /// given endpoint is not an absolute URI.
    pub fn build(self) -> client::Result<PublicClient> {
        let token_endpoint = self
            .token_endpoint
            .as_deref()
            .ok_or(client::Error::MissingTokenEndpoint)?;

        let built = PublicClient::new(self.client_id, token_endpoint)?;

        Ok(match self.request_timeout {
            Some(timeout) => built.with_request_timeout(timeout),
            None => built,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_client_with_defaults() {
        let built = client("my-client")
            .with_token_endpoint("https://example.com/oauth2/token")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(built.client_id(), "my-client");
        assert_eq!(built.token_endpoint().as_str(), "https://example.com/oauth2/token");
        assert_eq!(built.request_timeout(), client::DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn applies_custom_request_timeout() {
        let built = client("my-client")
            .with_token_endpoint("https://example.com/oauth2/token")
            .unwrap()
            .with_request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(built.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_empty_client_id_at_build_time() {
        let err = client("")
            .with_token_endpoint("https://example.com/oauth2/token")
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, client::Error::EmptyClientId));
    }
}
