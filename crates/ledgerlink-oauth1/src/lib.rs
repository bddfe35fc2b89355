//! OAuth1 (RFC 5849) client: request signing plus the three-step token
//! exchange (request token, user authorization, access token).
//!
//! Only the non-RSA signature methods are implemented; key-pair app types are
//! refused further up, where the provider client is built.

pub mod client;
pub mod signature;

pub use client::*;
