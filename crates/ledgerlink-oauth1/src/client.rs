use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use url::{Position, Url};

use ledgerlink_config::{ProviderConfig, SignatureMethod};
use ledgerlink_core::ApiError;

use crate::signature;

/// A token/secret pair: a pending request token or a granted access token.
/// Serializable because both live in the browser session between redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    pub secret: String,
}

/// Wire shape of the provider's token-endpoint responses (form-encoded).
#[derive(Debug, Deserialize)]
struct TokenBody {
    oauth_token: String,
    oauth_token_secret: String,
}

#[derive(Debug, Deserialize)]
struct ProblemBody {
    oauth_problem: Option<String>,
    oauth_problem_advice: Option<String>,
}

/// OAuth1 protocol client bound to one consumer registration.
///
/// Endpoint URLs are validated once at construction so a bad config fails at
/// boot instead of in the middle of a handshake.
#[derive(Debug, Clone)]
pub struct Oauth1Client {
    consumer_key: String,
    consumer_secret: String,
    method: SignatureMethod,
    request_token_url: Url,
    authorize_url: Url,
    access_token_url: Url,
    http: reqwest::Client,
}

impl Oauth1Client {
    pub fn new(provider: &ProviderConfig, http: reqwest::Client) -> Result<Self, ApiError> {
        let parse = |label: &str, raw: &str| {
            Url::parse(raw).map_err(|e| ApiError::config(&format!("invalid {label}: {e}")))
        };

        Ok(Self {
            consumer_key: provider.consumer_key.clone(),
            consumer_secret: provider.consumer_secret.clone(),
            method: provider.signature_method,
            request_token_url: parse("request_token_url", &provider.endpoints.request_token_url)?,
            authorize_url: parse("authorize_url", &provider.endpoints.authorize_url)?,
            access_token_url: parse("access_token_url", &provider.endpoints.access_token_url)?,
            http,
        })
    }

    /// First leg: obtain an unauthorized request token. `callback_url` is
    /// where the provider sends the browser after the user decides.
    pub async fn request_token(&self, callback_url: &str) -> Result<Token, ApiError> {
        let url = self.request_token_url.clone();
        let extra = [("oauth_callback", callback_url)];
        let body = self.signed_post(url, None, &extra).await?;
        parse_token_response(&body)
    }

    /// Second leg: the URL the user's browser is redirected to.
    pub fn user_authorize_url(&self, request_token: &Token) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("oauth_token", &request_token.token);
        url.to_string()
    }

    /// Third leg: swap the request token plus the callback verifier for an
    /// access token.
    pub async fn access_token(
        &self,
        request_token: &Token,
        verifier: &str,
    ) -> Result<Token, ApiError> {
        let url = self.access_token_url.clone();
        let extra = [("oauth_verifier", verifier)];
        let body = self.signed_post(url, Some(request_token), &extra).await?;
        parse_token_response(&body)
    }

    /// Build the `Authorization: OAuth ...` header for an arbitrary request,
    /// signing with the current time and a fresh nonce.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &Url,
        token: Option<&Token>,
        extra: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        self.authorization_header_at(method, url, token, extra, unix_timestamp()?, &nonce())
    }

    /// Deterministic core of `authorization_header`; split out so signing can
    /// be tested against fixed timestamps and nonces.
    fn authorization_header_at(
        &self,
        method: &str,
        url: &Url,
        token: Option<&Token>,
        extra: &[(&str, &str)],
        timestamp: u64,
        nonce: &str,
    ) -> Result<String, ApiError> {
        let method_label = match self.method {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::Plaintext => "PLAINTEXT",
        };
        let timestamp = timestamp.to_string();

        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), method_label.to_string()),
            ("oauth_timestamp".into(), timestamp),
            ("oauth_version".into(), "1.0".into()),
        ];
        if let Some(token) = token {
            oauth_params.push(("oauth_token".into(), token.token.clone()));
        }
        for (k, v) in extra {
            oauth_params.push((k.to_string(), v.to_string()));
        }

        // The base string covers the query plus the protocol params; the
        // base URL is everything up to (not including) the query.
        let mut all_params = oauth_params.clone();
        for (k, v) in url.query_pairs() {
            all_params.push((k.into_owned(), v.into_owned()));
        }
        let base_url = &url[..Position::AfterPath];
        let base_string = signature::signature_base_string(method, base_url, &all_params);

        let token_secret = token.map(|t| t.secret.as_str()).unwrap_or("");
        let sig = signature::sign(self.method, &base_string, &self.consumer_secret, token_secret)?;
        oauth_params.push(("oauth_signature".into(), sig));

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, signature::percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {fields}"))
    }

    async fn signed_post(
        &self,
        url: Url,
        token: Option<&Token>,
        extra: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        let header = self.authorization_header("POST", &url, token, extra)?;

        tracing::debug!(url = %url, "token endpoint request");

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| ApiError::network(&e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(&e.to_string()))?;

        if !status.is_success() {
            return Err(problem_from_response(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Map a failed provider response to an error, surfacing `oauth_problem`
/// rejections (form-encoded bodies) so callers can branch on them.
pub fn problem_from_response(status: u16, body: &str) -> ApiError {
    if let Ok(parsed) = serde_urlencoded::from_str::<ProblemBody>(body) {
        if let Some(problem) = parsed.oauth_problem {
            return ApiError::oauth_problem(&problem, parsed.oauth_problem_advice.as_deref());
        }
    }

    let snippet: String = body.chars().take(200).collect();
    ApiError::provider(&format!("HTTP {status}: {snippet}"))
}

fn parse_token_response(body: &str) -> Result<Token, ApiError> {
    let parsed: TokenBody = serde_urlencoded::from_str(body)
        .map_err(|e| ApiError::malformed_response(&format!("token response: {e}")))?;

    Ok(Token {
        token: parsed.oauth_token,
        secret: parsed.oauth_token_secret,
    })
}

fn unix_timestamp() -> Result<u64, ApiError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ApiError::config(&format!("system clock before epoch: {e}")))
}

fn nonce() -> String {
    let mut rng = rand::rng();
    let nonce: String = (0..32)
        .map(|_| {
            let idx = rng.random_range(0..62);
            match idx {
                0..=25 => (b'a' + idx) as char,
                26..=51 => (b'A' + (idx - 26)) as char,
                _ => (b'0' + (idx - 52)) as char,
            }
        })
        .collect();
    nonce
}
