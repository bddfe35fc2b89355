// Integration tests: the route table against a mock provider.

mod common;

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};

    use ledgerlink::models::{ApiError, InvoiceStatus, InvoiceType};

    use crate::common;

    macro_rules! test_app {
        ($provider:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($provider))
                    .app_data(web::Data::new(common::templates()))
                    .wrap(common::session_middleware())
                    .configure(common::routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn home_redirects_to_invoices() {
        let provider = common::provider(common::MockAccounting::seeded());
        let app = test_app!(provider);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(common::location(&resp), "/invoices");
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let provider = common::provider(common::MockAccounting::seeded());
        let app = test_app!(provider);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn error_page_renders_the_message() {
        let provider = common::provider(common::MockAccounting::seeded());
        let app = test_app!(provider);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/error?error=something+went+wrong")
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("something went wrong"));
    }

    #[actix_web::test]
    async fn resource_pages_start_the_handshake_when_disconnected() {
        let provider = common::provider(common::MockAccounting::seeded());
        let app = test_app!(provider);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/contacts").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            common::location(&resp),
            "https://provider.test/authorize?oauth_token=req-token"
        );
        // The pending request token must have been written to the session.
        assert!(!common::session_cookie(&resp).is_empty());
    }

    #[actix_web::test]
    async fn completed_handshake_unlocks_the_contact_list() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let cookie = common::connect(&app).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/contacts")
                .insert_header((header::COOKIE, cookie))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("ABC Limited"));
        assert!(body.contains("office@abc.example"));
    }

    #[actix_web::test]
    async fn callback_without_a_pending_handshake_lands_on_the_error_page() {
        let provider = common::provider(common::MockAccounting::seeded());
        let app = test_app!(provider);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/access?oauth_verifier=whatever")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(common::location(&resp).starts_with("/error?error="));
    }

    #[actix_web::test]
    async fn callback_with_a_mismatched_token_is_refused() {
        let provider = common::provider(common::MockAccounting::seeded());
        let app = test_app!(provider);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/invoices").to_request()).await;
        let cookie = common::session_cookie(&resp);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/access?oauth_token=someone-elses&oauth_verifier=ok-verifier")
                .insert_header((header::COOKIE, cookie))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(common::location(&resp).starts_with("/error?error="));
    }

    #[actix_web::test]
    async fn created_contacts_reach_the_provider_and_redirect_back() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let cookie = common::connect(&app).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/createcontact")
                .insert_header((header::COOKIE, cookie))
                .set_form([("Name", "Fresh Books Ltd")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(common::location(&resp), "/contacts");

        let contacts = accounting.contacts.lock().unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[1].name, "Fresh Books Ltd");
    }

    #[actix_web::test]
    async fn blank_contact_names_rerender_the_form() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/createcontact")
                .set_form([("Name", "")])
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Name is required"));
        assert_eq!(accounting.contacts.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn created_invoices_carry_the_posted_line_item() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let cookie = common::connect(&app).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/createinvoice")
                .insert_header((header::COOKIE, cookie))
                .set_form([
                    ("Type", "ACCREC"),
                    ("Contact", "ABC Limited"),
                    ("Date", "2026-08-06"),
                    ("DueDate", ""),
                    ("Description", "Onsite project management"),
                    ("Quantity", "2"),
                    ("Price", "120.5"),
                    ("AccountCode", "200"),
                    ("Status", "DRAFT"),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(common::location(&resp), "/invoices");

        let invoices = accounting.invoices.lock().unwrap();
        assert_eq!(invoices.len(), 2);
        let created = &invoices[1];
        assert_eq!(created.invoice_type, InvoiceType::AccountsReceivable);
        assert_eq!(created.status, InvoiceStatus::Draft);
        // Blank optional fields must not survive as empty strings.
        assert!(created.due_date.is_none());
        assert_eq!(created.line_items[0].quantity, 2.0);
        assert_eq!(created.line_items[0].unit_amount, 120.5);
        assert_eq!(created.line_items[0].account_code.as_deref(), Some("200"));
    }

    #[actix_web::test]
    async fn unknown_invoice_statuses_are_not_forwarded() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/createinvoice")
                .set_form([
                    ("Type", "ACCREC"),
                    ("Contact", "ABC Limited"),
                    ("Description", "Consulting"),
                    ("Quantity", "1"),
                    ("Price", "10"),
                    ("Status", "ARCHIVED"),
                ])
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("unsupported invoice status"));
        assert_eq!(accounting.invoices.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn rejected_tokens_restart_the_authorize_redirect() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let cookie = common::connect(&app).await;
        accounting.fail_next_with(ApiError::oauth_problem(
            "token_rejected",
            Some("Token has been revoked"),
        ));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/invoices")
                .insert_header((header::COOKIE, cookie))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            common::location(&resp),
            "https://provider.test/authorize?oauth_token=req-token"
        );
    }

    #[actix_web::test]
    async fn other_provider_failures_land_on_the_error_page() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let cookie = common::connect(&app).await;
        accounting.fail_next_with(ApiError::provider("HTTP 500: upstream fell over"));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/contacts")
                .insert_header((header::COOKIE, cookie))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(common::location(&resp).starts_with("/error?error=provider_error"));
    }

    #[actix_web::test]
    async fn raw_invoice_view_pretty_prints_payloads() {
        let accounting = common::MockAccounting::seeded();
        let provider = common::provider(accounting.clone());
        let app = test_app!(provider);

        let cookie = common::connect(&app).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/invoicesraw")
                .insert_header((header::COOKIE, cookie))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("INV-0001"));
        assert!(body.contains("<pre>"));
    }
}
