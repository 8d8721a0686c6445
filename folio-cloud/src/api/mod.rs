//! API routes for folio-cloud

pub mod account;
pub mod admin;
pub mod auth;
pub mod health;
pub mod payments;
pub mod paytech_ipn;
pub mod portfolio;
pub mod public;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::account_auth::{account_auth_middleware, admin_only_middleware};
use crate::auth::rate_limit::{login_rate_limit, payment_rate_limit, register_rate_limit};
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, ServiceError>;

/// IPN bodies are small; anything bigger is not PayTech
const IPN_BODY_LIMIT: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    // Registration and login (no auth, rate limited)
    let auth = Router::new()
        .route(
            "/api/register",
            post(auth::register).route_layer(middleware::from_fn_with_state(
                state.clone(),
                register_rate_limit,
            )),
        )
        .route(
            "/api/login",
            post(auth::login).route_layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        );

    // Payment intake (rate limited, proof upload gets a larger body limit)
    let intake = Router::new()
        .route(
            "/api/payments/manual",
            post(payments::submit_manual_payment)
                .layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/api/payments/paytech", post(payments::start_paytech_payment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            payment_rate_limit,
        ));

    // Signed-in account
    let account = Router::new()
        .route("/api/me", get(account::get_me))
        .route(
            "/api/portfolio",
            get(portfolio::get_portfolio).put(portfolio::update_portfolio),
        )
        .route("/api/portfolio/publish", post(portfolio::publish_portfolio))
        .route("/api/payments", get(payments::list_payments))
        .merge(intake)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            account_auth_middleware,
        ));

    // Admin: auth runs first (outermost), then the role check
    let admin = Router::new()
        .route("/api/admin/payments", get(admin::list_payments))
        .route("/api/admin/payments/{id}/approve", post(admin::approve_payment))
        .route("/api/admin/payments/{id}/reject", post(admin::reject_payment))
        .route(
            "/api/admin/accounts/{id}/status",
            put(admin::update_account_status),
        )
        .route(
            "/api/admin/portfolios/{id}/publish",
            post(admin::publish_portfolio),
        )
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            account_auth_middleware,
        ));

    // PayTech IPN (signature-verified, raw body)
    let gateway = Router::new().route(
        "/paytech/ipn",
        post(paytech_ipn::handle_ipn).layer(DefaultBodyLimit::max(IPN_BODY_LIMIT)),
    );

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/public/portfolios/{slug}",
            get(public::get_public_portfolio),
        )
        .nest_service("/uploads", ServeDir::new(&state.upload_dir));

    Router::new()
        .merge(public)
        .merge(auth)
        .merge(account)
        .merge(admin)
        .merge(gateway)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use shared::models::{AccountRole, PaymentStatus};
    use tower::ServiceExt;

    use super::*;
    use crate::billing::clock::ManualClock;
    use crate::billing::memory::{GATEWAY_SECRET, MemoryStorage, MemoryStore, StubGateway};
    use crate::billing::{BillingService, Pricing};
    use crate::paytech::signature;

    struct TestApp {
        router: Router,
        state: AppState,
        store: Arc<MemoryStore>,
    }

    fn test_app() -> TestApp {
        let store = Arc::new(MemoryStore::default());
        store.add_account("acc-a");
        let storage = Arc::new(MemoryStorage::default());
        let billing = BillingService::new(
            store.clone(),
            Arc::new(StubGateway::default()),
            storage.clone(),
            Arc::new(ManualClock::new(1_767_225_600_000)),
            Pricing {
                amount: 5000,
                currency: "XOF".into(),
            },
            1024,
        );
        let state = AppState::for_tests(billing, storage);
        TestApp {
            router: create_router(state.clone()),
            state,
            store,
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ipn_request(body: &[u8], signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/paytech/ipn")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("X-PayTech-Signature", sig);
        }
        builder.body(Body::from(body.to_vec())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = app
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_ipn_acknowledges_and_approves() {
        let app = test_app();
        let checkout = app
            .state
            .billing
            .request_gateway_payment("acc-a")
            .await
            .unwrap();
        let ref_command = checkout.payment.ref_command.unwrap();

        let body = serde_json::json!({
            "type_event": "sale_complete",
            "ref_command": ref_command,
            "payment_method": "Wave",
        })
        .to_string();
        let sig = signature::sign(body.as_bytes(), GATEWAY_SECRET);

        let response = app
            .router
            .clone()
            .oneshot(ipn_request(body.as_bytes(), Some(&sig)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
        assert_eq!(app.store.payments()[0].status, PaymentStatus::Approved);

        // redelivery is acknowledged the same way
        let response = app
            .router
            .oneshot(ipn_request(body.as_bytes(), Some(&sig)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.store.activations(), 1);
    }

    #[tokio::test]
    async fn test_ipn_unmatched_ref_is_acknowledged() {
        let app = test_app();
        let body = br#"{"type_event":"sale_complete","ref_command":"FOLIO-UNKNOWN"}"#;
        let sig = signature::sign(body, GATEWAY_SECRET);
        let response = app
            .router
            .oneshot(ipn_request(body, Some(&sig)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.store.payments().is_empty());
    }

    #[tokio::test]
    async fn test_ipn_bad_signature_is_forbidden() {
        let app = test_app();
        app.state
            .billing
            .request_gateway_payment("acc-a")
            .await
            .unwrap();
        let ref_command = app.store.payments()[0].ref_command.clone().unwrap();
        let body = format!(r#"{{"type_event":"sale_complete","ref_command":"{ref_command}"}}"#);

        let forged = signature::sign(body.as_bytes(), "guessed");
        let response = app
            .router
            .clone()
            .oneshot(ipn_request(body.as_bytes(), Some(&forged)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router
            .oneshot(ipn_request(body.as_bytes(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(app.store.payments()[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_ipn_signed_unparseable_payload_is_acknowledged() {
        let app = test_app();
        app.state
            .billing
            .request_gateway_payment("acc-a")
            .await
            .unwrap();
        let body = br#"{"type_event":"sale_complete","ref_command":12345}"#;
        let sig = signature::sign(body, GATEWAY_SECRET);
        let response = app
            .router
            .oneshot(ipn_request(body, Some(&sig)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
        assert_eq!(app.store.payments()[0].status, PaymentStatus::Pending);
        assert_eq!(app.store.activations(), 0);
    }

    #[tokio::test]
    async fn test_public_expiry_follows_injected_clock() {
        use shared::models::{AccountStatus, Portfolio, PortfolioStatus};

        let app = test_app();
        let now = app.state.billing.now_millis();
        assert_eq!(now, 1_767_225_600_000);
        let portfolio = |expires_at: i64| Portfolio {
            id: "pf-1".into(),
            account_id: "acc-a".into(),
            slug: "ada".into(),
            title: "Ada".into(),
            template: "classic".into(),
            content: serde_json::json!({}),
            status: PortfolioStatus::Published,
            published_at: Some(now - 1000),
            expires_at: Some(expires_at),
            created_at: now - 1000,
            updated_at: now - 1000,
        };

        let visible = public::public_view(portfolio(now + 1), AccountStatus::Active, now).unwrap();
        assert_eq!(visible.slug, "ada");

        let err = public::public_view(portfolio(now), AccountStatus::Active, now).unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::PortfolioExpired);
        assert_eq!(err.http_status(), StatusCode::GONE);

        let err = public::public_view(portfolio(now + 1), AccountStatus::Suspended, now).unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::PortfolioNotPublished);
    }

    #[tokio::test]
    async fn test_account_routes_require_token() {
        let app = test_app();
        for (method, uri) in [
            ("GET", "/api/me"),
            ("POST", "/api/payments/paytech"),
            ("GET", "/api/admin/payments"),
            ("POST", "/api/admin/payments/p-1/approve"),
        ] {
            let response = app
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
        assert!(app.store.payments().is_empty());
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let app = test_app();
        let token = crate::auth::account_auth::create_token(
            "acc-a",
            "a@example.com",
            AccountRole::Admin,
            "not-the-server-secret",
        )
        .unwrap();
        let response = app
            .router
            .oneshot(
                Request::get("/api/admin/payments")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], shared::error::ErrorCode::TokenInvalid.code());
    }
}
