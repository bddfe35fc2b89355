use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use ledgerlink_core::{
    ApiError, Contact, ContactsEnvelope, Invoice, InvoicesEnvelope,
};
use ledgerlink_oauth1::{problem_from_response, Oauth1Client, Token};
use ledgerlink_ports::AccountingApi;

/// Resource client bound to one access token. Cheap to build; one is minted
/// per authorized request, mirroring how the session carries the token.
pub struct AccountingClient {
    oauth: Oauth1Client,
    api_base: String,
    token: Token,
    http: reqwest::Client,
}

impl AccountingClient {
    pub fn new(oauth: Oauth1Client, api_base: String, token: Token, http: reqwest::Client) -> Self {
        Self {
            oauth,
            api_base,
            token,
            http,
        }
    }

    fn endpoint(&self, resource: &str) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.api_base.trim_end_matches('/'), resource);
        Url::parse(&raw).map_err(|e| ApiError::config(&format!("invalid API url {raw}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, ApiError> {
        let url = self.endpoint(resource)?;
        let header = self
            .oauth
            .authorization_header("GET", &url, Some(&self.token), &[])?;

        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, header)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::network(&e.to_string()))?;

        read_json(response).await
    }

    // Create is a PUT on this API; POST updates existing resources.
    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(resource)?;
        let header = self
            .oauth
            .authorization_header("PUT", &url, Some(&self.token), &[])?;

        tracing::debug!(%url, "PUT");

        let response = self
            .http
            .put(url)
            .header(AUTHORIZATION, header)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::network(&e.to_string()))?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::network(&e.to_string()))?;

    if !status.is_success() {
        return Err(problem_from_response(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| ApiError::malformed_response(&e.to_string()))
}

/// The API echoes created resources back in the same envelope as reads.
fn first_created<T>(resource: &str, mut items: Vec<T>) -> Result<T, ApiError> {
    if items.is_empty() {
        return Err(ApiError::malformed_response(&format!(
            "create response carried an empty {resource} envelope"
        )));
    }
    Ok(items.remove(0))
}

#[async_trait]
impl AccountingApi for AccountingClient {
    async fn contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let envelope: ContactsEnvelope = self.get("Contacts").await?;
        Ok(envelope.contacts)
    }

    async fn create_contact(&self, contact: &Contact) -> Result<Contact, ApiError> {
        let envelope: ContactsEnvelope = self.put("Contacts", contact).await?;
        let created = first_created("Contacts", envelope.contacts)?;
        tracing::info!(contact_id = ?created.contact_id, "contact created");
        Ok(created)
    }

    async fn invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        let envelope: InvoicesEnvelope = self.get("Invoices").await?;
        Ok(envelope.invoices)
    }

    async fn create_invoice(&self, invoice: &Invoice) -> Result<Invoice, ApiError> {
        let envelope: InvoicesEnvelope = self.put("Invoices", invoice).await?;
        let created = first_created("Invoices", envelope.invoices)?;
        tracing::info!(invoice_id = ?created.invoice_id, "invoice created");
        Ok(created)
    }
}
