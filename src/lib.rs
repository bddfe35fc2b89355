//! Library exports.
//!
//! The implementation lives in the extracted `crates/` members; re-exporting
//! them here keeps one import root for integration tests and downstream
//! users.

pub use ledgerlink_accounting as accounting;
pub use ledgerlink_actix as web;
pub use ledgerlink_config as config;
pub use ledgerlink_core as models;
pub use ledgerlink_oauth1 as oauth1;
pub use ledgerlink_ports as ports;
pub use ledgerlink_server as server;
