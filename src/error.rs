//! Crate-wide error aggregation.
//!
//! Every module owns its own `Error` enum scoped to its own failure modes
//! (see [`crate::client::Error`], [`crate::listener::Error`]). This module
//! folds them into a single [`Error`] so callers only ever need one
//! `Result` alias.

use thiserror::Error;

use crate::{client, listener};

/// Errors that can be returned by any public operation of this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] client::Error),

    #[error(transparent)]
    Listener(#[from] listener::Error),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
