//! # OAuth 2.0 for native apps
//!
//! Rust implementation of [RFC 8252](https://datatracker.ietf.org/doc/html/rfc8252)
//! (OAuth 2.0 for Native Apps) using loopback interface redirection, plus the
//! Client Credentials and Refresh Token grants from
//! [RFC 6749](https://datatracker.ietf.org/doc/html/rfc6749).
//!
//! ## Authorization Code Grant with PKCE
//!
//! The native-app flow is the hard part: it derives a PKCE pair
//! ([RFC 7636](https://datatracker.ietf.org/doc/html/rfc7636)), mints a CSRF
//! state, starts a one-shot [`listener::RedirectListener`] on `127.0.0.1`,
//! launches an external browser pointed at the authorization server, waits
//! for the redirect, then exchanges the authorization code for tokens.
//!
//! ```rust,no_run
//! use oauth2::{client, Result};
//!
//! fn example(http_client: impl oauth2::http_client::HttpClient) -> Result<()> {
//!     let client = client("my-client-id")
//!         .with_token_endpoint("https://example.com/oauth2/token")?
//!         .build()?;
//!
//!     let grant = client.authorization_code_grant("https://example.com/oauth2/authorize")?;
//!
//!     let res = grant.authorize(&http_client, |url| {
//!         println!("open this URL in your browser: {url}");
//!     }, &[])?;
//!
//!     println!("token endpoint returned: {}", res.status());
//!     Ok(())
//! }
//! ```
//!
//! See [`grant::authorization_code`], [`grant::client_credentials`] and
//! [`grant::refresh`] for the three supported grants, and [`builder`] for the
//! fluent construction façade.
//!
//! ## Out of scope
//!
//! This crate does not bring its own HTTP client (see [`http_client`]), does
//! not launch a browser itself, and does not parse token response bodies —
//! callers get the raw [`http::Response<String>`] and decide what to do with
//! it.

pub mod builder;
pub mod client;
pub mod error;
pub mod grant;
pub mod http_client;
pub mod listener;
pub mod pkce;
pub mod query;
pub mod random;
pub mod response;

pub use builder::client;
pub use client::PublicClient;
pub use error::{Error, Result};
pub use response::Response;
