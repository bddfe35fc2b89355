use async_trait::async_trait;
use std::sync::Arc;

use ledgerlink_core::{ApiError, Contact, Invoice};
use ledgerlink_oauth1::Token;

/// The accounting provider boundary as the handlers see it: the OAuth1
/// handshake legs plus a way to mint a resource client for a granted token.
///
/// This intentionally mirrors the operations the routes actually perform.
#[async_trait]
pub trait Provider: Send + Sync {
    /// First handshake leg; the returned token is held in the session until
    /// the callback arrives.
    async fn request_token(&self) -> Result<Token, ApiError>;

    /// Where to send the user's browser for the second leg.
    fn authorize_url(&self, request_token: &Token) -> String;

    /// Third leg: trade the pending request token and the callback's
    /// verifier for an access token.
    async fn access_token(
        &self,
        request_token: &Token,
        verifier: &str,
    ) -> Result<Token, ApiError>;

    /// A resource client bound to one access token.
    fn accounting(&self, access_token: &Token) -> DynAccounting;
}

/// Resource CRUD against the provider's accounting API.
#[async_trait]
pub trait AccountingApi: Send + Sync {
    async fn contacts(&self) -> Result<Vec<Contact>, ApiError>;
    async fn create_contact(&self, contact: &Contact) -> Result<Contact, ApiError>;
    async fn invoices(&self) -> Result<Vec<Invoice>, ApiError>;
    async fn create_invoice(&self, invoice: &Invoice) -> Result<Invoice, ApiError>;
}

pub type DynProvider = Arc<dyn Provider>;
pub type DynAccounting = Arc<dyn AccountingApi>;
