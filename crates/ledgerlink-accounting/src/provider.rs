use async_trait::async_trait;
use std::sync::Arc;

use ledgerlink_config::{AppType, ProviderConfig};
use ledgerlink_core::ApiError;
use ledgerlink_oauth1::{Oauth1Client, Token};
use ledgerlink_ports::{DynAccounting, Provider};

use crate::client::AccountingClient;

/// The real provider adapter: owns the consumer registration and a shared
/// HTTP connection pool, and mints per-token resource clients.
#[derive(Debug)]
pub struct LedgerProvider {
    oauth: Oauth1Client,
    api_base: String,
    callback_url: String,
    http: reqwest::Client,
}

impl LedgerProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        // RSA-SHA1 app types need an uploaded key pair; refusing here beats
        // sending signatures the provider will reject one request later.
        if config.app_type != AppType::Public {
            return Err(ApiError::config(&format!(
                "app type '{}' signs with an RSA key pair, which this client does not support; \
                 register a public app",
                config.app_type
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("ledgerlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::config(&format!("HTTP client: {e}")))?;

        let oauth = Oauth1Client::new(config, http.clone())?;

        Ok(Self {
            oauth,
            api_base: config.endpoints.api_base_url.trim_end_matches('/').to_string(),
            callback_url: config.callback_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl Provider for LedgerProvider {
    async fn request_token(&self) -> Result<Token, ApiError> {
        self.oauth.request_token(&self.callback_url).await
    }

    fn authorize_url(&self, request_token: &Token) -> String {
        self.oauth.user_authorize_url(request_token)
    }

    async fn access_token(
        &self,
        request_token: &Token,
        verifier: &str,
    ) -> Result<Token, ApiError> {
        self.oauth.access_token(request_token, verifier).await
    }

    fn accounting(&self, access_token: &Token) -> DynAccounting {
        Arc::new(AccountingClient::new(
            self.oauth.clone(),
            self.api_base.clone(),
            access_token.clone(),
            self.http.clone(),
        ))
    }
}
