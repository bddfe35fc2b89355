//! Shared test harness: a mock provider the route table can run against,
//! plus app-assembly helpers.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web};
use tera::Tera;

use ledgerlink::models::{ApiError, Contact, ContactRef, Invoice, InvoiceStatus, InvoiceType};
use ledgerlink::oauth1::Token;
use ledgerlink::ports::{AccountingApi, DynAccounting, DynProvider, Provider};
use ledgerlink::web::handlers;

pub const REQUEST_TOKEN: &str = "req-token";
pub const VERIFIER: &str = "ok-verifier";

/// In-memory stand-in for the accounting API. `fail_with` forces the next
/// calls to fail, for exercising the error policy.
pub struct MockAccounting {
    pub contacts: Mutex<Vec<Contact>>,
    pub invoices: Mutex<Vec<Invoice>>,
    pub fail_with: Mutex<Option<ApiError>>,
}

impl MockAccounting {
    pub fn seeded() -> Arc<Self> {
        let contact = Contact {
            contact_id: Some("bd2270c3-8706-4c11-9cfb-000b551c3f51".to_string()),
            name: "ABC Limited".to_string(),
            email_address: Some("office@abc.example".to_string()),
            contact_status: Some("ACTIVE".to_string()),
        };
        let invoice = Invoice {
            invoice_type: InvoiceType::AccountsReceivable,
            contact: ContactRef {
                name: "ABC Limited".to_string(),
            },
            date: Some("2026-08-01".to_string()),
            due_date: Some("2026-08-15".to_string()),
            line_items: vec![],
            status: InvoiceStatus::Authorised,
            invoice_id: Some("243216c5-369e-4056-ac67-05388f86dc81".to_string()),
            invoice_number: Some("INV-0001".to_string()),
            total: Some(148.5),
            amount_due: Some(0.0),
        };

        Arc::new(Self {
            contacts: Mutex::new(vec![contact]),
            invoices: Mutex::new(vec![invoice]),
            fail_with: Mutex::new(None),
        })
    }

    pub fn fail_next_with(&self, err: ApiError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    fn failure(&self) -> Option<ApiError> {
        self.fail_with.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountingApi for MockAccounting {
    async fn contacts(&self) -> Result<Vec<Contact>, ApiError> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self.contacts.lock().unwrap().clone()),
        }
    }

    async fn create_contact(&self, contact: &Contact) -> Result<Contact, ApiError> {
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(contact.clone())
    }

    async fn invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self.invoices.lock().unwrap().clone()),
        }
    }

    async fn create_invoice(&self, invoice: &Invoice) -> Result<Invoice, ApiError> {
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(invoice.clone())
    }
}

pub struct MockProvider {
    pub accounting: Arc<MockAccounting>,
}

#[async_trait]
impl Provider for MockProvider {
    async fn request_token(&self) -> Result<Token, ApiError> {
        Ok(Token {
            token: REQUEST_TOKEN.to_string(),
            secret: "req-secret".to_string(),
        })
    }

    fn authorize_url(&self, request_token: &Token) -> String {
        format!(
            "https://provider.test/authorize?oauth_token={}",
            request_token.token
        )
    }

    async fn access_token(
        &self,
        request_token: &Token,
        verifier: &str,
    ) -> Result<Token, ApiError> {
        if request_token.token != REQUEST_TOKEN || verifier != VERIFIER {
            return Err(ApiError::oauth_problem("token_rejected", Some("bad swap")));
        }
        Ok(Token {
            token: "access-token".to_string(),
            secret: "access-secret".to_string(),
        })
    }

    fn accounting(&self, _access_token: &Token) -> DynAccounting {
        self.accounting.clone()
    }
}

pub fn provider(accounting: Arc<MockAccounting>) -> DynProvider {
    Arc::new(MockProvider { accounting })
}

pub fn templates() -> Tera {
    ledgerlink::server::build_templates("templates/**/*.html").expect("templates load")
}

pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .build()
}

/// The app's route table, minus static files (not under test).
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .route("/error", web::get().to(handlers::error_page))
        .route("/access", web::get().to(handlers::access_callback))
        .route("/contacts", web::get().to(handlers::contacts))
        .route("/createcontact", web::get().to(handlers::create_contact_form))
        .route("/createcontact", web::post().to(handlers::create_contact))
        .route("/invoices", web::get().to(handlers::invoices))
        .route("/invoicesraw", web::get().to(handlers::invoices_raw))
        .route("/createinvoice", web::get().to(handlers::create_invoice_form))
        .route("/createinvoice", web::post().to(handlers::create_invoice));
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .expect("response should set the session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
}

/// Walk the full handshake (gate redirect, then the provider callback) and
/// return a session cookie holding an access token.
pub async fn connect<S, B>(app: &S) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let resp = test::call_service(app, test::TestRequest::get().uri("/invoices").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("https://provider.test/authorize"));
    let cookie = session_cookie(&resp);

    let resp = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "/access?oauth_token={REQUEST_TOKEN}&oauth_verifier={VERIFIER}"
            ))
            .insert_header((header::COOKIE, cookie))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/invoices");

    session_cookie(&resp)
}
