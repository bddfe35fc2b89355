//! Framework-agnostic domain types for the accounting provider's wire format.
//!
//! This crate is intended to be reused by other applications without needing to
//! fork the main `ledgerlink` repository.

pub mod models;

pub use models::*;
