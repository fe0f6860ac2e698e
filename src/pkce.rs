//! Proof Key for Code Exchange ([RFC 7636]).
//!
//! A [`Pkce`] pair binds the authorization code to a secret known only to
//! the client that started the flow: the authorization server only ever
//! sees the `challenge`, and the `verifier` is revealed exclusively at
//! token-exchange time, defeating code interception on the redirect.
//!
//! [RFC 7636]: https://datatracker.ietf.org/doc/html/rfc7636

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::random::random_token;

/// Length of the PKCE verifier, per RFC 7636 §4.1 (the spec allows 43-128
/// characters; this crate always generates the minimum).
const VERIFIER_LEN: usize = 43;

/// A freshly generated PKCE verifier/challenge pair.
///
/// Created once per grant instance and used exactly once: the challenge is
/// sent with the authorization request, the verifier with the token
/// exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pkce {
    verifier: String,
    challenge: String,
}

impl Pkce {
    /// Generates a fresh verifier and its S256 challenge.
    pub fn generate() -> Self {
        let verifier = random_token(VERIFIER_LEN);
        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    fn challenge_for(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    /// The code verifier, sent to the token endpoint as `code_verifier`.
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// The code challenge, sent to the authorization endpoint as
    /// `code_challenge`.
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// The challenge transformation method. Always `"S256"` — this crate
    /// does not implement the discouraged `plain` method.
    pub fn method(&self) -> &'static str {
        "S256"
    }
}
