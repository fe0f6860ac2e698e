//! Cryptographically strong randomness used for PKCE verifiers and CSRF
//! state tokens.
//!
//! Backed by [`rand::rngs::OsRng`], the operating system CSPRNG. There is no
//! global mutable state here: every call draws fresh entropy straight from
//! the OS.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

/// Draws `n` cryptographically strong random bytes.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Generates a random, URL-safe, unpadded base64 token of exactly `len`
/// characters.
///
/// Draws `ceil(len / 4) * 3` random bytes, base64url-encodes them without
/// padding, then truncates to `len` characters. Each base64 character
/// encodes 6 bits of entropy, so a 16-character token carries 96 bits.
pub fn random_token(len: usize) -> String {
    let byte_len = len.div_ceil(4) * 3;
    let bytes = random_bytes(byte_len);
    let mut token = URL_SAFE_NO_PAD.encode(bytes);
    token.truncate(len);
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_token_has_exact_length() {
        for len in 0..=128 {
            let token = random_token(len);
            assert_eq!(token.len(), len);
            assert!(token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
        }
    }

    #[test]
    fn random_token_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(random_token(16)));
        }
    }

    #[test]
    fn random_bytes_has_exact_length() {
        assert_eq!(random_bytes(0).len(), 0);
        assert_eq!(random_bytes(32).len(), 32);
    }
}
