//! Server assembly: configuration, template engine, session middleware, and
//! the route table, wired together into a runnable `HttpServer`.

use std::collections::HashMap;
use std::sync::Arc;

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, web, App, HttpServer};
use tera::Tera;
use tracing_actix_web::TracingLogger;

use ledgerlink_accounting::LedgerProvider;
use ledgerlink_actix::handlers;
use ledgerlink_config::{Config, SessionConfig};
use ledgerlink_ports::DynProvider;

/// Load templates and register the filters they rely on.
pub fn build_templates(glob: &str) -> Result<Tera, tera::Error> {
    let mut tera = Tera::new(glob)?;
    tera.register_filter("pretty_json", pretty_json);
    Ok(tera)
}

/// `{{ value | pretty_json }}`: the raw-invoice view shows payloads as the
/// JSON they arrived as.
fn pretty_json(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let pretty =
        serde_json::to_string_pretty(value).map_err(|e| tera::Error::msg(e.to_string()))?;
    Ok(tera::Value::String(pretty))
}

fn session_key(config: &SessionConfig) -> Key {
    match &config.key {
        Some(raw) if raw.len() >= 32 => Key::derive_from(raw.as_bytes()),
        Some(_) => {
            log::warn!("session.key is shorter than 32 bytes; generating a random key instead");
            Key::generate()
        }
        None => {
            log::info!("no session.key configured; sessions will not survive a restart");
            Key::generate()
        }
    }
}

pub async fn run() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().map_err(std::io::Error::other)?;

    let provider: DynProvider = Arc::new(
        LedgerProvider::new(&config.provider).map_err(|e| std::io::Error::other(e.to_string()))?,
    );
    let templates = build_templates(&config.ui.templates_glob)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let key = session_key(&config.session);
    let cookie_secure = config.session.secure;
    let assets_dir = config.ui.assets_dir.clone();

    let provider = web::Data::new(provider);
    let templates = web::Data::new(templates);

    let host = config.server.host.clone();
    let port = config.server.port;
    log::info!("listening on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(provider.clone())
            .app_data(templates.clone())
            .wrap(TracingLogger::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            .route("/", web::get().to(handlers::index))
            .route("/health", web::get().to(handlers::health))
            .route("/error", web::get().to(handlers::error_page))
            .route("/access", web::get().to(handlers::access_callback))
            .route("/contacts", web::get().to(handlers::contacts))
            .route("/createcontact", web::get().to(handlers::create_contact_form))
            .route("/createcontact", web::post().to(handlers::create_contact))
            .route("/invoices", web::get().to(handlers::invoices))
            .route("/invoicesraw", web::get().to(handlers::invoices_raw))
            .route("/createinvoice", web::get().to(handlers::create_invoice_form))
            .route("/createinvoice", web::post().to(handlers::create_invoice))
            .service(Files::new("/assets", assets_dir.clone()))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
