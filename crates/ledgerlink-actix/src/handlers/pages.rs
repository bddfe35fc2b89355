use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::handlers::auth::redirect;

/// Render a template or fail the request; template errors are a deployment
/// problem, not something the user can fix.
pub fn render(tera: &Tera, name: &str, ctx: &Context) -> Result<HttpResponse> {
    let body = tera.render(name, ctx).map_err(|e| {
        tracing::error!(template = name, error = %e, "template render failed");
        actix_web::error::ErrorInternalServerError(e)
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// The landing page has nothing of its own to say; invoices are the home
/// view.
pub async fn index() -> HttpResponse {
    redirect("/invoices")
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

pub async fn error_page(
    query: web::Query<ErrorQuery>,
    tera: web::Data<Tera>,
) -> Result<HttpResponse> {
    let mut ctx = Context::new();
    ctx.insert("active", &serde_json::json!({ "overview": true }));
    if let Some(error) = &query.error {
        tracing::warn!(%error, "rendering error page");
        ctx.insert("error", error);
    }
    render(&tera, "index.html", &ctx)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "ledgerlink",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
