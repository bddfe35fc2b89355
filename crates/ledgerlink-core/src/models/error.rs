use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "actix")]
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Error reported by the provider boundary (network, signing, or an
/// `oauth_problem` the provider sent back in a form-encoded body).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiError {
    pub error: String,
    pub error_description: Option<String>,
    /// The provider's `oauth_problem` value, when the failure was an OAuth
    /// rejection rather than a transport or application error.
    pub oauth_problem: Option<String>,
}

impl ApiError {
    pub fn new(error: &str, description: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            error_description: description.map(|s| s.to_string()),
            oauth_problem: None,
        }
    }

    pub fn network(description: &str) -> Self {
        Self::new("network_error", Some(description))
    }

    pub fn config(description: &str) -> Self {
        Self::new("config_error", Some(description))
    }

    pub fn provider(description: &str) -> Self {
        Self::new("provider_error", Some(description))
    }

    pub fn malformed_response(description: &str) -> Self {
        Self::new("malformed_response", Some(description))
    }

    pub fn oauth_problem(problem: &str, description: Option<&str>) -> Self {
        Self {
            error: "oauth_problem".to_string(),
            error_description: description.map(|s| s.to_string()),
            oauth_problem: Some(problem.to_string()),
        }
    }

    /// A rejected token means the stored access token is no longer usable and
    /// the user has to go through the authorize redirect again.
    pub fn is_token_rejected(&self) -> bool {
        matches!(self.oauth_problem.as_deref(), Some("token_rejected"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.oauth_problem, &self.error_description) {
            (Some(problem), _) => write!(f, "{}: {}", self.error, problem),
            (None, Some(desc)) => write!(f, "{}: {}", self.error, desc),
            (None, None) => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(feature = "actix")]
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "oauth_problem" => StatusCode::UNAUTHORIZED,
            "network_error" | "provider_error" | "malformed_response" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}
