//! Client Credentials Grant ([RFC 6749 §4.4](https://datatracker.ietf.org/doc/html/rfc6749#section-4.4)).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use zeroize::Zeroizing;

use crate::{
    client::{Charset, PublicClient},
    http_client::HttpClient,
    Result,
};

#[cfg(feature = "async")]
use crate::http_client::AsyncHttpClient;

/// A configured Client Credentials Grant, with the `Authorization: Basic`
/// header already precomputed.
#[derive(Debug)]
pub struct ClientCredentialsGrant {
    client: PublicClient,
    scopes: Vec<String>,
    basic_auth_header: String,
}

impl ClientCredentialsGrant {
    pub(crate) fn new(client: PublicClient, charset: Charset, client_secret: &str) -> Self {
        let basic_auth_header = basic_auth_header(charset, client.client_id(), client_secret);

        Self {
            client,
            scopes: Vec::new(),
            basic_auth_header,
        }
    }

    /// Restricts the token request to `scopes`. No scopes requested means
    /// `scope` is omitted entirely from the request.
    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.iter().map(|s| s.to_string()).collect();
        self
    }

    fn build_request(&self) -> http::Request<String> {
        let mut params = vec![("grant_type".to_string(), "client_credentials".to_string())];

        if !self.scopes.is_empty() {
            params.push(("scope".to_string(), self.scopes.join(" ")));
        }

        // RFC 6749 §2.3.1: client_id/client_secret MUST NOT be in the body
        // when Basic authentication is used.
        let mut request = self.client.build_token_request(&params);
        request.headers_mut().insert(
            http::header::AUTHORIZATION,
            http::HeaderValue::from_str(&self.basic_auth_header)
                .expect("basic auth header is always a valid header value"),
        );
        request
    }

    /// Sends the client credentials request via `http_client` and returns
    /// the token endpoint's response verbatim.
    pub fn authorize(&self, http_client: &impl HttpClient) -> Result<http::Response<String>> {
        debug!(
            "sending client_credentials request to {}",
            self.client.token_endpoint()
        );
        let request = self.build_request();
        let response = http_client
            .send(request)
            .map_err(|err| std::io::Error::other(err))?;
        Ok(response)
    }

    /// The asynchronous counterpart of [`Self::authorize`].
    #[cfg(feature = "async")]
    pub async fn authorize_async(
        &self,
        http_client: &(dyn AsyncHttpClient + Send + Sync),
    ) -> Result<http::Response<String>> {
        debug!(
            "sending async client_credentials request to {}",
            self.client.token_endpoint()
        );
        let request = self.build_request();
        let response = http_client
            .send(request)
            .await
            .map_err(|err| std::io::Error::other(err))?;
        Ok(response)
    }
}

/// Precomputes `Basic base64(client_id:client_secret)`, scrubbing every
/// intermediate buffer before it is dropped.
///
/// Only the final header string outlives this function — it is
/// unavoidably kept in memory for the lifetime of the request.
fn basic_auth_header(charset: Charset, client_id: &str, client_secret: &str) -> String {
    let Charset::Utf8 = charset;

    let credentials = Zeroizing::new(format!("{client_id}:{client_secret}"));
    let encoded = Zeroizing::new(STANDARD.encode(credentials.as_bytes()));
    format!("Basic {}", encoded.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PublicClient;

    fn client() -> PublicClient {
        PublicClient::new("Aladdin", "https://login.example.com/oauth2/token").unwrap()
    }

    #[test]
    fn basic_header_matches_rfc7617_example() {
        let grant = client().client_credentials_grant(Charset::Utf8, "open sesame");
        let request = grant.build_request();
        assert_eq!(
            request
                .headers()
                .get(http::header::AUTHORIZATION)
                .unwrap(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn body_never_contains_client_id_or_secret() {
        let grant = client().client_credentials_grant(Charset::Utf8, "open sesame");
        let request = grant.build_request();
        assert!(!request.body().contains("Aladdin"));
        assert!(!request.body().contains("open"));
        assert_eq!(request.body(), "grant_type=client_credentials");
    }

    #[test]
    fn scopes_are_space_joined() {
        let grant = client()
            .client_credentials_grant(Charset::Utf8, "open sesame")
            .with_scopes(&["read", "write"]);
        let request = grant.build_request();
        assert_eq!(request.body(), "grant_type=client_credentials&scope=read+write");
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn authorize_async_sends_same_request_as_blocking() {
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

        let grant = client()
            .client_credentials_grant(Charset::Utf8, "open sesame")
            .with_scopes(&["read"]);

        let response = grant.authorize_async(&http_client).await.unwrap();
        assert_eq!(response.status(), 200);

        let request = seen.lock().unwrap().take().unwrap();
        assert_eq!(
            request.headers().get(http::header::AUTHORIZATION).unwrap(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
        assert_eq!(request.body(), "grant_type=client_credentials&scope=read");
    }
}
