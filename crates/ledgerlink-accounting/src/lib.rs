//! Accounting-provider adapter: the `Provider`/`AccountingApi` port
//! implementations backed by OAuth1-signed HTTP.

pub mod client;
pub mod provider;

pub use client::*;
pub use provider::*;
