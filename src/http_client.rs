//! The HTTP client capability this crate expects callers to inject.
//!
//! This crate never talks to the network itself beyond the loopback
//! listener. Token endpoint requests are built as plain [`http::Request`]
//! values and handed to a caller-supplied [`HttpClient`] (or, under the
//! `async` feature, [`AsyncHttpClient`]) — bring `reqwest`, `ureq`, or
//! whatever your application already uses.

use std::error::Error as StdError;

/// A boxed, type-erased transport error, matching the teacher's pattern of
/// not inventing a new error type for an external collaborator's failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A blocking HTTP client capable of sending the token endpoint requests
/// this crate builds.
pub trait HttpClient {
    /// Sends `request` and returns the response verbatim. This crate does
    /// not inspect the status code beyond what callers do themselves.
    fn send(&self, request: http::Request<String>) -> Result<http::Response<String>, BoxError>;
}

impl<F> HttpClient for F
where
    F: Fn(http::Request<String>) -> Result<http::Response<String>, BoxError>,
{
    fn send(&self, request: http::Request<String>) -> Result<http::Response<String>, BoxError> {
        self(request)
    }
}

/// The asynchronous counterpart of [`HttpClient`], available under the
/// `async` feature.
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait AsyncHttpClient: Send + Sync {
    /// Sends `request` and returns the response verbatim.
    async fn send(
        &self,
        request: http::Request<String>,
    ) -> Result<http::Response<String>, BoxError>;
}
