//! The session-backed OAuth1 gate: every resource page funnels through
//! `connected_or_redirect`, and `/access` completes the handshake.

use actix_session::Session;
use actix_web::{http::header, web, HttpResponse, Result};
use serde::Deserialize;

use ledgerlink_core::ApiError;
use ledgerlink_ports::{DynAccounting, DynProvider};

use crate::session;

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Redirect to the error page with the message in the query, the catch-all
/// branch of the error policy.
pub fn error_redirect(message: &str) -> HttpResponse {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    redirect(&format!("/error?{query}"))
}

/// Start the handshake: fetch a request token, remember it and where the
/// user was going, and send the browser to the provider.
pub async fn authorize_redirect(
    session: &Session,
    provider: &DynProvider,
    return_to: &str,
) -> Result<HttpResponse> {
    let request_token = match provider.request_token().await {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "request token fetch failed");
            return Ok(error_redirect(&err.to_string()));
        }
    };

    let authorize_url = provider.authorize_url(&request_token);
    session.insert(session::REQUEST_TOKEN, &request_token)?;
    session.insert(session::RETURN_TO, return_to)?;

    Ok(redirect(&authorize_url))
}

/// Outcome of the gate: either a resource client for the session's access
/// token, or the response that sends the user off to authorize.
pub enum Gate {
    Connected(DynAccounting),
    Redirect(HttpResponse),
}

pub async fn connected_or_redirect(
    session: &Session,
    provider: &DynProvider,
    return_to: &str,
) -> Result<Gate> {
    match session::access_token(session) {
        Some(token) => Ok(Gate::Connected(provider.accounting(&token))),
        None => Ok(Gate::Redirect(
            authorize_redirect(session, provider, return_to).await?,
        )),
    }
}

/// Shared failure branch for provider calls: a rejected token drops the
/// stale credential and restarts the handshake, anything else lands on the
/// error page.
pub async fn handle_api_error(
    err: ApiError,
    session: &Session,
    provider: &DynProvider,
    return_to: &str,
) -> Result<HttpResponse> {
    tracing::error!(error = %err, return_to, "provider call failed");

    if err.is_token_rejected() {
        session.remove(session::ACCESS_TOKEN);
        authorize_redirect(session, provider, return_to).await
    } else {
        Ok(error_redirect(&err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
}

/// OAuth1 callback: swap the pending request token plus the verifier for an
/// access token, then resume wherever the user was headed.
pub async fn access_callback(
    session: Session,
    query: web::Query<AccessQuery>,
    provider: web::Data<DynProvider>,
) -> Result<HttpResponse> {
    let Some(request_token) = session::request_token(&session) else {
        return Ok(error_redirect("no authorization is pending in this session"));
    };

    // The provider echoes the token it authorized; a mismatch means this
    // callback does not belong to the pending handshake.
    if let Some(echoed) = &query.oauth_token {
        if echoed != &request_token.token {
            return Ok(error_redirect("callback token does not match the pending request"));
        }
    }

    let Some(verifier) = query.oauth_verifier.as_deref() else {
        return Ok(error_redirect("authorization was not completed"));
    };

    let return_to = session::take_return_to(&session).unwrap_or_else(|| "/".to_string());

    match provider.access_token(&request_token, verifier).await {
        Ok(access_token) => {
            session.remove(session::REQUEST_TOKEN);
            session.insert(session::ACCESS_TOKEN, &access_token)?;
            Ok(redirect(&return_to))
        }
        Err(err) => handle_api_error(err, &session, &provider, &return_to).await,
    }
}
