use actix_session::Session;
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use tera::{Context, Tera};
use validator::Validate;

use ledgerlink_core::Contact;
use ledgerlink_ports::DynProvider;

use crate::handlers::auth::{connected_or_redirect, handle_api_error, redirect, Gate};
use crate::handlers::pages::render;

fn contacts_nav() -> serde_json::Value {
    serde_json::json!({ "contacts": true, "nav": { "accounting": true } })
}

pub async fn contacts(
    session: Session,
    provider: web::Data<DynProvider>,
    tera: web::Data<Tera>,
) -> Result<HttpResponse> {
    let api = match connected_or_redirect(&session, &provider, "/contacts").await? {
        Gate::Connected(api) => api,
        Gate::Redirect(response) => return Ok(response),
    };

    match api.contacts().await {
        Ok(contacts) => {
            let mut ctx = Context::new();
            ctx.insert("contacts", &contacts);
            ctx.insert("active", &contacts_nav());
            render(&tera, "contacts.html", &ctx)
        }
        Err(err) => handle_api_error(err, &session, &provider, "/contacts").await,
    }
}

pub async fn create_contact_form(tera: web::Data<Tera>) -> Result<HttpResponse> {
    let mut ctx = Context::new();
    ctx.insert("active", &contacts_nav());
    render(&tera, "createcontact.html", &ctx)
}

/// Field names match what the form posts (and what the API calls them).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactForm {
    #[serde(rename = "Name")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

pub async fn create_contact(
    form: web::Form<CreateContactForm>,
    session: Session,
    provider: web::Data<DynProvider>,
    tera: web::Data<Tera>,
) -> Result<HttpResponse> {
    if let Err(errors) = form.validate() {
        let mut ctx = Context::new();
        ctx.insert("active", &contacts_nav());
        ctx.insert("outcome", "Error");
        ctx.insert("err", &errors.to_string());
        return render(&tera, "createcontact.html", &ctx);
    }

    let api = match connected_or_redirect(&session, &provider, "/createcontact").await? {
        Gate::Connected(api) => api,
        Gate::Redirect(response) => return Ok(response),
    };

    match api.create_contact(&Contact::named(&form.name)).await {
        Ok(_) => Ok(redirect("/contacts")),
        Err(err) => handle_api_error(err, &session, &provider, "/createcontact").await,
    }
}
