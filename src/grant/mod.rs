//! The three grants this crate drives: Authorization Code (with PKCE),
//! Client Credentials, and Refresh Token.

pub mod authorization_code;
pub mod client_credentials;
pub mod refresh;
