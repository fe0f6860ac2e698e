//! Authorization Code Grant with PKCE ([RFC 6749 §4.1] + [RFC 7636]),
//! driven the way [RFC 8252] prescribes for native apps: a loopback
//! listener stands in for a registered HTTPS redirect URI.
//!
//! [RFC 6749 §4.1]: https://datatracker.ietf.org/doc/html/rfc6749#section-4.1
//! [RFC 7636]: https://datatracker.ietf.org/doc/html/rfc7636
//! [RFC 8252]: https://datatracker.ietf.org/doc/html/rfc8252

use std::thread;

use log::debug;
use url::Url;

use crate::{
    client::PublicClient, error::Error as CrateError, http_client::HttpClient, listener::RedirectListener,
    pkce::Pkce, query, response::Response, Result,
};

#[cfg(feature = "async")]
use crate::http_client::AsyncHttpClient;

/// A configured, not-yet-started Authorization Code Grant.
///
/// Holds a [`Pkce`] pair generated the moment [`PublicClient::authorization_code_grant`]
/// was called. [`Self::authorize`] (and [`Self::authorize_async`]) consume
/// `self`: once the flow has run, the PKCE verifier has been revealed to
/// the token endpoint and must never be reused, so the type system makes a
/// second call impossible rather than merely inadvisable.
#[derive(Debug)]
pub struct AuthorizationCodeGrant {
    client: PublicClient,
    authorization_endpoint: Url,
    pkce: Pkce,
    redirect_path: String,
    redirect_ports: Vec<u16>,
    success_response: Response,
    error_response: Response,
}

impl AuthorizationCodeGrant {
    pub(crate) fn new(client: PublicClient, authorization_endpoint: Url) -> Self {
        Self {
            client,
            authorization_endpoint,
            pkce: Pkce::generate(),
            redirect_path: format!("/{}", crate::random::random_token(16)),
            redirect_ports: vec![0],
            success_response: Response::default_success(),
            error_response: Response::default_error(),
        }
    }

    /// Overrides the redirect path (must begin with `/`). Defaults to `/`
    /// followed by a random 16-character token.
    pub fn set_redirect_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.redirect_path = path.into();
        self
    }

    /// Overrides the ports tried, in order, when binding the loopback
    /// listener. Defaults to `[0]` (system-assigned).
    pub fn set_redirect_ports(&mut self, ports: &[u16]) -> &mut Self {
        self.redirect_ports = ports.to_vec();
        self
    }

    /// Overrides the HTML reply written when the authorization code is
    /// received.
    pub fn set_success_response(&mut self, response: Response) -> &mut Self {
        self.success_response = response;
        self
    }

    /// Overrides the HTML reply written when the authorization server
    /// reports an error, or the callback is otherwise rejected.
    pub fn set_error_response(&mut self, response: Response) -> &mut Self {
        self.error_response = response;
        self
    }

    /// The PKCE pair generated for this grant. Exposed mainly for tests
    /// that need to assert on the challenge sent in the authorization URI.
    pub fn pkce(&self) -> &Pkce {
        &self.pkce
    }

    fn start_listener(&self) -> Result<RedirectListener> {
        let mut listener = RedirectListener::start(&self.redirect_path, &self.redirect_ports)
            .map_err(CrateError::from)?;
        listener.set_success_response(self.success_response.clone());
        listener.set_error_response(self.error_response.clone());
        Ok(listener)
    }

    /// Assembles the authorization URI: the endpoint's existing query is
    /// preserved (RFC 6749 §3.1), then `response_type`, `client_id`,
    /// `state`, `code_challenge`, `code_challenge_method`, `redirect_uri`
    /// and, if any were requested, `scope` are appended.
    fn build_auth_uri(&self, redirect_uri: &Url, csrf_token: &str, scopes: &[&str]) -> Url {
        let mut params: Vec<(String, String)> = query::parse(self.authorization_endpoint.query());

        params.push(("response_type".to_string(), "code".to_string()));
        params.push(("client_id".to_string(), self.client.client_id().to_string()));
        params.push(("state".to_string(), csrf_token.to_string()));
        params.push(("code_challenge".to_string(), self.pkce.challenge().to_string()));
        params.push(("code_challenge_method".to_string(), self.pkce.method().to_string()));
        params.push(("redirect_uri".to_string(), redirect_uri.to_string()));

        if !scopes.is_empty() {
            params.push(("scope".to_string(), scopes.join(" ")));
        }

        let mut uri = self.authorization_endpoint.clone();
        uri.set_query(Some(&query::build(&params)));
        uri
    }

    fn build_exchange_request(&self, code: &str, redirect_uri: &Url) -> http::Request<String> {
        let params = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("client_id".to_string(), self.client.client_id().to_string()),
            ("code_verifier".to_string(), self.pkce.verifier().to_string()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), redirect_uri.to_string()),
        ];
        self.client.build_token_request(&params)
    }

    /// Runs the full flow: start the listener, assemble the authorization
    /// URI, hand it to `browser_callback` on its own thread, block waiting
    /// for the redirect, then exchange the code for tokens via
    /// `http_client`.
    ///
    /// The listener is released on every exit path. `browser_callback` is
    /// dispatched fire-and-forget: its own panics or errors are not
    /// observed by this call.
    pub fn authorize(
        self,
        http_client: &impl HttpClient,
        browser_callback: impl FnOnce(&Url) + Send + 'static,
        scopes: &[&str],
    ) -> Result<http::Response<String>> {
        let listener = self.start_listener()?;
        let redirect_uri = listener.redirect_uri();
        let auth_uri = self.build_auth_uri(&redirect_uri, listener.csrf_token(), scopes);

        debug!("dispatching browser callback for authorization URI");
        thread::spawn(move || browser_callback(&auth_uri));

        let code = listener.receive().map_err(CrateError::from)?;

        let request = self.build_exchange_request(&code, &redirect_uri);
        let response = http_client
            .send(request)
            .map_err(|err| std::io::Error::other(err))?;
        Ok(response)
    }

    /// The asynchronous counterpart of [`Self::authorize`].
    ///
    /// The blocking listener wait runs on [`tokio::task::spawn_blocking`];
    /// the browser callback is dispatched via [`tokio::spawn`] — both onto
    /// the ambient Tokio runtime, standing in for the "shared worker pool"
    /// of the wire-format contract. Neither receives an explicit executor
    /// argument; see `DESIGN.md` for why that departs from the source
    /// material's API shape.
    #[cfg(feature = "async")]
    pub async fn authorize_async(
        self,
        http_client: &(dyn AsyncHttpClient + Send + Sync),
        browser_callback: impl FnOnce(&Url) + Send + 'static,
        scopes: &[&str],
    ) -> Result<http::Response<String>> {
        let listener = self.start_listener()?;
        let redirect_uri = listener.redirect_uri();
        let auth_uri = self.build_auth_uri(&redirect_uri, listener.csrf_token(), scopes);

        debug!("dispatching async browser callback for authorization URI");
        tokio::spawn(async move { browser_callback(&auth_uri) });

        let code = tokio::task::spawn_blocking(move || listener.receive())
            .await
            .map_err(|err| std::io::Error::other(err))?
            .map_err(CrateError::from)?;

        let request = self.build_exchange_request(&code, &redirect_uri);
        let response = http_client
            .send(request)
            .await
            .map_err(|err| std::io::Error::other(err))?;
        Ok(response)
    }
}
