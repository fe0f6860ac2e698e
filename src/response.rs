//! HTTP replies the [`crate::listener::RedirectListener`] may write back to
//! the browser.
//!
//! A small sum type is sufficient here: three variants, one `write_to`
//! operation. No trait object is needed.

use std::io::{self, Write};

/// An HTTP reply written to the browser that completed the redirect.
///
/// Every variant always carries `Connection: Close` — the listener never
/// keeps the socket open past one reply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// Status line and `Connection: Close` only, no body.
    Empty { status: u16 },

    /// An HTML body with a correct `Content-Length` in UTF-8 bytes.
    Html { status: u16, body: String },

    /// A `303 See Other` redirect to `target`, no body.
    Redirect { target: String },
}

impl Response {
    /// The default success reply: `200 OK` with a short HTML body.
    pub fn default_success() -> Self {
        Self::html(200, "Success")
    }

    /// The default error reply: `200 OK` with a short HTML body.
    ///
    /// Kept at `200` rather than a 4xx: by the time the listener writes the
    /// error response, the request itself was well-formed — it is the
    /// authorization *outcome* that failed, not the HTTP request.
    pub fn default_error() -> Self {
        Self::html(200, "Error")
    }

    /// Builds an `Empty { status }` response.
    pub fn empty(status: u16) -> Self {
        Self::Empty { status }
    }

    /// Builds an `Html { status, body }` response from an owned body.
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::Html {
            status,
            body: body.into(),
        }
    }

    /// Builds a `Redirect { target }` response. Always replies `303 See
    /// Other`.
    pub fn redirect(target: impl Into<String>) -> Self {
        Self::Redirect {
            target: target.into(),
        }
    }

    fn status(&self) -> u16 {
        match self {
            Self::Empty { status } => *status,
            Self::Html { status, .. } => *status,
            Self::Redirect { .. } => 303,
        }
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            303 => "See Other",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Unknown",
        }
    }

    /// Writes this response over `sink` as a complete HTTP/1.1 reply.
    pub fn write_to(&self, sink: &mut impl Write) -> io::Result<()> {
        let status = self.status();
        write!(sink, "HTTP/1.1 {status} {}\r\n", Self::reason(status))?;
        write!(sink, "Connection: Close\r\n")?;

        match self {
            Self::Empty { .. } => {
                write!(sink, "\r\n")?;
            }
            Self::Html { body, .. } => {
                write!(sink, "Content-Type: text/html; charset=UTF-8\r\n")?;
                write!(sink, "Content-Length: {}\r\n", body.as_bytes().len())?;
                write!(sink, "\r\n")?;
                sink.write_all(body.as_bytes())?;
                write!(sink, "\r\n")?;
            }
            Self::Redirect { target } => {
                write!(sink, "Location: {target}\r\n")?;
                write!(sink, "\r\n")?;
            }
        }

        sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(response: &Response) -> String {
        let mut buf = Vec::new();
        response.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_has_no_body() {
        let out = written(&Response::empty(404));
        assert!(out.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(out.contains("Connection: Close\r\n"));
        assert!(out.ends_with("\r\n\r\n"));
    }

    #[test]
    fn html_has_correct_content_length() {
        let out = written(&Response::html(200, "héllo"));
        let len = "héllo".len();
        assert!(out.contains(&format!("Content-Length: {len}\r\n")));
        assert!(out.contains("Content-Type: text/html; charset=UTF-8\r\n"));
        assert!(out.ends_with("héllo\r\n"));
    }

    #[test]
    fn redirect_is_303_with_location() {
        let out = written(&Response::redirect("https://example.com/done"));
        assert!(out.starts_with("HTTP/1.1 303 See Other\r\n"));
        assert!(out.contains("Location: https://example.com/done\r\n"));
    }
}
