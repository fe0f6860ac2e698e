//! The loopback redirect listener ([RFC 8252 §7.3]).
//!
//! A purpose-built, single-use HTTP/1.1 server: binds `127.0.0.1` on a
//! chosen or ephemeral port, accepts exactly one request, parses only the
//! request line, validates the path and CSRF state, and replies with a
//! configurable [`Response`]. Deliberately not a general HTTP server —
//! headers, bodies, chunked transfer and upgrades are never read.
//!
//! [RFC 8252 §7.3]: https://datatracker.ietf.org/doc/html/rfc8252#section-7.3

use std::{
    io::{BufRead, BufReader},
    net::{TcpListener as StdTcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use log::{debug, warn};
use thiserror::Error;
use url::Url;

use crate::{query, response::Response};

/// How often the accept loop checks the cancellation flag while polling a
/// non-blocking socket. There is no portable way to interrupt a thread
/// blocked in `accept` on stable Rust, so this is the idiomatic substitute:
/// short enough that `close()` feels instantaneous, long enough to not spin
/// the CPU.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors raised by the redirect listener.
#[derive(Debug, Error)]
pub enum Error {
    #[error("redirect path {0:?} must begin with '/'")]
    InvalidPath(String),

    #[error("no configured port could be bound")]
    AddressInUse,

    #[error("cannot bind loopback socket")]
    Bind(#[source] std::io::Error),

    #[error("malformed request line: {0:?}")]
    MalformedRequest(String),

    #[error("unsupported method {0:?}, only GET is accepted")]
    UnsupportedMethod(String),

    #[error("request path {actual:?} does not match the configured path {expected:?}")]
    WrongPath { expected: String, actual: String },

    #[error("missing or invalid state parameter")]
    BadState,

    #[error("neither code nor error parameter was present")]
    MissingCode,

    #[error("authorization server returned an error: {0}")]
    AuthorizationDenied(String),

    #[error("receive was interrupted")]
    Interrupted,

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

/// A handle that can cancel a [`RedirectListener::receive`] blocked on
/// another thread.
///
/// Cheap to clone; every clone shares the same cancellation flag. Calling
/// [`Self::close`] more than once, or after `receive` has already returned,
/// is safe and a no-op.
#[derive(Clone, Debug)]
pub struct CloseHandle(Arc<AtomicBool>);

impl CloseHandle {
    /// Requests cancellation. The accept loop observes this within
    /// [`POLL_INTERVAL`] and returns [`Error::Interrupted`].
    pub fn close(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A bound, single-use loopback HTTP listener, ready to [`Self::receive`]
/// exactly one redirect.
pub struct RedirectListener {
    socket: StdTcpListener,
    port: u16,
    path: String,
    csrf_token: String,
    success_response: Response,
    error_response: Response,
    interrupted: Arc<AtomicBool>,
}

impl RedirectListener {
    /// Binds a loopback listener for `path`.
    ///
    /// `path` must begin with `/`. `ports` is tried in order; an empty
    /// slice (or `[0]`) binds to a system-assigned port. On `AddressInUse`
    /// for a given port, the next port is tried; if every candidate fails,
    /// the whole call fails with [`Error::AddressInUse`] and no socket is
    /// left bound. On success, a fresh CSRF token is minted.
    pub fn start(path: &str, ports: &[u16]) -> Result<Self, Error> {
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let ports: &[u16] = if ports.is_empty() { &[0] } else { ports };
        let socket = bind_first_available(ports)?;
        let port = socket.local_addr().map_err(Error::Io)?.port();

        debug!("redirect listener bound to 127.0.0.1:{port}{path}");

        Ok(Self {
            socket,
            port,
            path: path.to_string(),
            csrf_token: crate::random::random_token(16),
            success_response: Response::default_success(),
            error_response: Response::default_error(),
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The redirect URI to send to the authorization server:
    /// `http://127.0.0.1:<bound_port><path>`. Always `127.0.0.1`, never
    /// `localhost`.
    pub fn redirect_uri(&self) -> Url {
        Url::parse(&format!("http://127.0.0.1:{}{}", self.port, self.path))
            .expect("redirect URI is always well-formed")
    }

    /// The CSRF state token minted when this listener was bound.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Overrides the default success response (`200 OK`, HTML "Success").
    pub fn set_success_response(&mut self, response: Response) {
        self.success_response = response;
    }

    /// Overrides the default error response (`200 OK`, HTML "Error").
    pub fn set_error_response(&mut self, response: Response) {
        self.error_response = response;
    }

    /// Returns a handle that can cancel a concurrent [`Self::receive`] call.
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle(Arc::clone(&self.interrupted))
    }

    /// Blocks until one client connects and its request line is parsed,
    /// validated, and replied to.
    ///
    /// Consumes `self`: the listener is single-use, so calling `receive`
    /// twice is impossible to express, not merely disallowed at runtime.
    /// The listening socket is released when this method returns, on every
    /// path — success, protocol failure, I/O failure, or interruption.
    pub fn receive(self) -> Result<String, Error> {
        let stream = self.accept_one()?;
        self.handle(stream)
    }

    fn accept_one(&self) -> Result<TcpStream, Error> {
        self.socket.set_nonblocking(true).map_err(Error::Io)?;

        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                debug!("redirect listener interrupted before a client connected");
                return Err(Error::Interrupted);
            }

            match self.socket.accept() {
                Ok((stream, _peer)) => {
                    stream.set_nonblocking(false).map_err(Error::Io)?;
                    return Ok(stream);
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => return Err(Error::Io(err)),
            }
        }
    }

    fn handle(&self, mut stream: TcpStream) -> Result<String, Error> {
        let request_line = read_request_line(&stream)?;

        let result = self.process_request_line(&request_line);

        match &result {
            Ok(code) => {
                debug!("redirect listener received authorization code");
                let _ = self.success_response.write_to(&mut stream);
                return Ok(code.clone());
            }
            Err(Error::AuthorizationDenied(reason)) => {
                warn!("authorization server denied the request: {reason}");
                let _ = self.error_response.write_to(&mut stream);
            }
            Err(Error::UnsupportedMethod(_)) => {
                let _ = Response::empty(405).write_to(&mut stream);
            }
            Err(Error::WrongPath { .. }) => {
                let _ = Response::empty(404).write_to(&mut stream);
            }
            Err(_) => {
                let _ = Response::empty(400).write_to(&mut stream);
            }
        }

        result
    }

    fn process_request_line(&self, line: &str) -> Result<String, Error> {
        let mut parts = line.trim_end().split(' ');
        let method = parts.next().filter(|s| !s.is_empty());
        let target = parts.next().filter(|s| !s.is_empty());
        let version = parts.next().filter(|s| !s.is_empty());

        let (method, target, _version) = match (method, target, version) {
            (Some(m), Some(t), Some(v)) => (m, t, v),
            _ => return Err(Error::MalformedRequest(line.to_string())),
        };

        if method != "GET" {
            return Err(Error::UnsupportedMethod(method.to_string()));
        }

        let url = Url::parse(&format!("http://127.0.0.1:{}{}", self.port, target))
            .map_err(|_| Error::MalformedRequest(line.to_string()))?;

        if url.path() != self.path {
            return Err(Error::WrongPath {
                expected: self.path.clone(),
                actual: url.path().to_string(),
            });
        }

        let params = query::parse(url.query());

        let state = query::get(&params, "state");
        if state != Some(self.csrf_token.as_str()) {
            return Err(Error::BadState);
        }

        if let Some(error) = query::get(&params, "error") {
            return Err(Error::AuthorizationDenied(error.to_string()));
        }

        if let Some(code) = query::get(&params, "code") {
            return Ok(code.to_string());
        }

        Err(Error::MissingCode)
    }
}

impl Drop for RedirectListener {
    fn drop(&mut self) {
        debug!("redirect listener socket released");
    }
}

fn bind_first_available(ports: &[u16]) -> Result<StdTcpListener, Error> {
    let mut last_err = None;

    for &port in ports {
        match StdTcpListener::bind(("127.0.0.1", port)) {
            Ok(socket) => return Ok(socket),
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                warn!("port {port} already in use, trying next candidate");
                last_err = Some(err);
            }
            Err(err) => return Err(Error::Bind(err)),
        }
    }

    match last_err {
        Some(_) => Err(Error::AddressInUse),
        None => Err(Error::AddressInUse),
    }
}

fn read_request_line(stream: &TcpStream) -> Result<String, Error> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).map_err(Error::Io)?;

    if line.is_empty() {
        return Err(Error::MalformedRequest(line));
    }

    Ok(line)
}
