//! Refresh Token Grant ([RFC 6749 §6](https://datatracker.ietf.org/doc/html/rfc6749#section-6)).

use log::debug;

use crate::{client::PublicClient, http_client::HttpClient, Result};

#[cfg(feature = "async")]
use crate::http_client::AsyncHttpClient;

/// A configured refresh token request, ready to dispatch.
#[derive(Debug)]
pub struct RefreshGrant {
    client: PublicClient,
    refresh_token: String,
    scopes: Vec<String>,
}

impl RefreshGrant {
    pub(crate) fn new(client: PublicClient, refresh_token: &str, scopes: &[&str]) -> Self {
        Self {
            client,
            refresh_token: refresh_token.to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builds the token endpoint request: `grant_type=refresh_token`,
    /// `refresh_token`, `client_id`, and `scope` (omitted entirely when no
    /// scopes were requested, never sent as an empty `scope=`).
    pub fn build_refresh_token_request(&self) -> http::Request<String> {
        let mut params = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), self.refresh_token.clone()),
            ("client_id".to_string(), self.client.client_id().to_string()),
        ];

        if !self.scopes.is_empty() {
            params.push(("scope".to_string(), self.scopes.join(" ")));
        }

        self.client.build_token_request(&params)
    }

    /// Sends the refresh request via `http_client` and returns the token
    /// endpoint's response verbatim. Non-2xx responses are not treated as
    /// errors — the caller inspects the status itself.
    pub fn refresh(&self, http_client: &impl HttpClient) -> Result<http::Response<String>> {
        debug!("sending refresh_token request to {}", self.client.token_endpoint());
        let request = self.build_refresh_token_request();
        let response = http_client
            .send(request)
            .map_err(|err| std::io::Error::other(err))?;
        Ok(response)
    }

    /// The asynchronous counterpart of [`Self::refresh`].
    #[cfg(feature = "async")]
    pub async fn refresh_async(
        &self,
        http_client: &(dyn AsyncHttpClient + Send + Sync),
    ) -> Result<http::Response<String>> {
        debug!("sending async refresh_token request to {}", self.client.token_endpoint());
        let request = self.build_refresh_token_request();
        let response = http_client
            .send(request)
            .await
            .map_err(|err| std::io::Error::other(err))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PublicClient;

    fn client() -> PublicClient {
        PublicClient::new("my-client", "https://login.example.com/oauth2/token").unwrap()
    }

    #[test]
    fn build_refresh_token_request_has_expected_body() {
        let grant = client().refresh("r3fr3sh70k3n", &["foo", "bar"]);
        let request = grant.build_refresh_token_request();
        assert_eq!(
            request.body(),
            "grant_type=refresh_token&refresh_token=r3fr3sh70k3n&client_id=my-client&scope=foo+bar"
        );
    }

    #[test]
    fn omits_scope_when_empty() {
        let grant = client().refresh("r3fr3sh70k3n", &[]);
        let request = grant.build_refresh_token_request();
        assert!(!request.body().contains("scope"));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn refresh_async_sends_same_request_as_blocking() {
        use std::sync::{Arc, Mutex};

        struct RecordingAsyncHttpClient {
            seen: Arc<Mutex<Option<http::Request<String>>>>,
        }

        #[async_trait::async_trait]
        impl AsyncHttpClient for RecordingAsyncHttpClient {
            async fn send(
                &self,
                request: http::Request<String>,
            ) -> std::result::Result<http::Response<String>, crate::http_client::BoxError> {
                *self.seen.lock().unwrap() = Some(request);
                Ok(http::Response::builder()
                    .status(200)
                    .body(String::new())
                    .unwrap())
            }
        }

        let seen = Arc::new(Mutex::new(None));
        let http_client = RecordingAsyncHttpClient {
            seen: Arc::clone(&seen),
        };

        let grant = client().refresh("r3fr3sh70k3n", &["foo", "bar"]);
        let response = grant.refresh_async(&http_client).await.unwrap();
        assert_eq!(response.status(), 200);

        let request = seen.lock().unwrap().take().unwrap();
        assert_eq!(
            request.body(),
            "grant_type=refresh_token&refresh_token=r3fr3sh70k3n&client_id=my-client&scope=foo+bar"
        );
    }
}
