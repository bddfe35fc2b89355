use actix_session::Session;
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use tera::{Context, Tera};
use validator::Validate;

use ledgerlink_core::{ContactRef, Invoice, InvoiceStatus, InvoiceType, LineItem};
use ledgerlink_ports::DynProvider;

use crate::handlers::auth::{connected_or_redirect, handle_api_error, redirect, Gate};
use crate::handlers::pages::render;

fn invoices_nav() -> serde_json::Value {
    serde_json::json!({ "invoices": true, "nav": { "accounting": true } })
}

pub async fn invoices(
    session: Session,
    provider: web::Data<DynProvider>,
    tera: web::Data<Tera>,
) -> Result<HttpResponse> {
    let api = match connected_or_redirect(&session, &provider, "/invoices").await? {
        Gate::Connected(api) => api,
        Gate::Redirect(response) => return Ok(response),
    };

    match api.invoices().await {
        Ok(invoices) => {
            let mut ctx = Context::new();
            ctx.insert("invoices", &invoices);
            ctx.insert("active", &invoices_nav());
            render(&tera, "invoices.html", &ctx)
        }
        Err(err) => handle_api_error(err, &session, &provider, "/invoices").await,
    }
}

/// Debugging view: every invoice pretty-printed as the JSON it arrived as.
pub async fn invoices_raw(
    session: Session,
    provider: web::Data<DynProvider>,
    tera: web::Data<Tera>,
) -> Result<HttpResponse> {
    let api = match connected_or_redirect(&session, &provider, "/invoicesraw").await? {
        Gate::Connected(api) => api,
        Gate::Redirect(response) => return Ok(response),
    };

    match api.invoices().await {
        Ok(invoices) => {
            let mut ctx = Context::new();
            ctx.insert("invoices", &invoices);
            ctx.insert("active", &invoices_nav());
            render(&tera, "invoicesraw.html", &ctx)
        }
        Err(err) => handle_api_error(err, &session, &provider, "/invoicesraw").await,
    }
}

pub async fn create_invoice_form(tera: web::Data<Tera>) -> Result<HttpResponse> {
    let mut ctx = Context::new();
    ctx.insert("active", &invoices_nav());
    render(&tera, "createinvoice.html", &ctx)
}

/// One invoice with a single line item, exactly the shape the form posts.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceForm {
    #[serde(rename = "Type")]
    pub invoice_type: InvoiceType,
    #[serde(rename = "Contact")]
    #[validate(length(min = 1, message = "Contact name is required"))]
    pub contact: String,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "DueDate")]
    pub due_date: Option<String>,
    #[serde(rename = "Description")]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(rename = "Quantity")]
    #[validate(range(min = 0.0, message = "Quantity must not be negative"))]
    pub quantity: f64,
    #[serde(rename = "Price")]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub unit_amount: f64,
    #[serde(rename = "AccountCode")]
    pub account_code: Option<String>,
    #[serde(rename = "Status")]
    pub status: InvoiceStatus,
}

/// Browsers post empty strings for fields left blank.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn create_invoice(
    form: web::Form<CreateInvoiceForm>,
    session: Session,
    provider: web::Data<DynProvider>,
    tera: web::Data<Tera>,
) -> Result<HttpResponse> {
    let validation = form.validate().err().map(|e| e.to_string()).or_else(|| {
        // The status enum tolerates unknown values on reads; writes must not
        // forward one.
        (form.status == InvoiceStatus::Unknown).then(|| "unsupported invoice status".to_string())
    });

    if let Some(message) = validation {
        let mut ctx = Context::new();
        ctx.insert("active", &invoices_nav());
        ctx.insert("outcome", "Error");
        ctx.insert("err", &message);
        return render(&tera, "createinvoice.html", &ctx);
    }

    let api = match connected_or_redirect(&session, &provider, "/createinvoice").await? {
        Gate::Connected(api) => api,
        Gate::Redirect(response) => return Ok(response),
    };

    let form = form.into_inner();
    let invoice = Invoice {
        invoice_type: form.invoice_type,
        contact: ContactRef {
            name: form.contact.trim().to_string(),
        },
        date: non_empty(form.date),
        due_date: non_empty(form.due_date),
        line_items: vec![LineItem {
            description: form.description,
            quantity: form.quantity,
            unit_amount: form.unit_amount,
            account_code: non_empty(form.account_code),
            line_amount: None,
        }],
        status: form.status,
        invoice_id: None,
        invoice_number: None,
        total: None,
        amount_due: None,
    };

    match api.create_invoice(&invoice).await {
        Ok(_) => Ok(redirect("/invoices")),
        Err(err) => handle_api_error(err, &session, &provider, "/createinvoice").await,
    }
}
