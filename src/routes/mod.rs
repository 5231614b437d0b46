use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod auth_otp_routes;

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/test", get(test_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest("/api/auth", auth::routes(app_state.clone()))
        .nest("/api", auth_otp_routes::auth_otp_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn test_handler() -> Json<&'static str> {
    Json("test ok")
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!("Health check ping failed: {}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::build_router;
    use crate::config::AppConfig;
    use crate::database::{dummy::DummyDb, AbstractDatabase};
    use crate::services::clock::ManualClock;
    use crate::services::email_service::testing::{FailingMailer, RecordingMailer};
    use crate::state::AppState;

    const EMAIL: &str = "user@example.com";

    struct TestApp {
        router: Router,
        db: DummyDb,
        mailer: Arc<RecordingMailer>,
        clock: Arc<ManualClock>,
    }

    fn test_app() -> TestApp {
        let db = DummyDb::default();
        let mailer = Arc::new(RecordingMailer::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let state = AppState::new(
            AppConfig::for_tests(),
            Arc::new(db.clone()),
            mailer.clone(),
            clock.clone(),
        );

        TestApp {
            router: build_router(state),
            db,
            mailer,
            clock,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, value)
    }

    async fn register(app: &TestApp, password: &str) {
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({ "name": "User", "email": EMAIL, "password": password })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    async fn login(app: &TestApp, password: &str) -> (StatusCode, serde_json::Value) {
        send(
            &app.router,
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": EMAIL, "password": password })),
            None,
        )
        .await
    }

    async fn current_code(app: &TestApp) -> String {
        app.db.find_otp(EMAIL).await.unwrap().unwrap().code
    }

    #[tokio::test]
    async fn liveness_endpoints_respond() {
        let app = test_app();
        let (status, body) = send(&app.router, "GET", "/test", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "test ok");

        let (status, body) = send(&app.router, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn full_reset_flow_over_http() {
        let app = test_app();
        register(&app, "old-password").await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "email": "  USER@example.com " })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["message"].is_string());
        assert_eq!(app.mailer.sent().len(), 1);

        let code = current_code(&app).await;
        let reset = serde_json::json!({ "email": EMAIL, "otp": code, "newPassword": "new-password" });

        let (status, _) = send(&app.router, "POST", "/api/auth/reset-password", Some(reset.clone()), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app.router, "POST", "/api/auth/reset-password", Some(reset), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid or expired OTP code");

        let (status, _) = login(&app, "old-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = login(&app, "new-password").await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app.router, "GET", "/api/auth/profile", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], EMAIL);
    }

    #[tokio::test]
    async fn forgot_password_for_unknown_email_is_404() {
        let app = test_app();
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "email": "nobody@example.com" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(app.mailer.sent().is_empty());
        assert!(app.db.otps.lock().await.is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_500() {
        let db = DummyDb::default();
        let state = AppState::new(
            AppConfig::for_tests(),
            Arc::new(db.clone()),
            Arc::new(FailingMailer),
            Arc::new(ManualClock::new(Utc::now())),
        );
        let app = TestApp {
            router: build_router(state),
            db,
            mailer: Arc::new(RecordingMailer::default()),
            clock: Arc::new(ManualClock::new(Utc::now())),
        };
        register(&app, "old-password").await;

        let (status, _) = send(
            &app.router,
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "email": EMAIL })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.db.find_otp(EMAIL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_over_http() {
        let app = test_app();
        register(&app, "old-password").await;
        send(
            &app.router,
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "email": EMAIL })),
            None,
        )
        .await;
        let code = current_code(&app).await;

        app.clock.advance(Duration::minutes(6));

        let (status, _) = send(
            &app.router,
            "POST",
            "/api/auth/reset-password",
            Some(serde_json::json!({ "email": EMAIL, "otp": code, "newPassword": "new-password" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = login(&app, "old-password").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_bodies_are_rejected() {
        let app = test_app();
        let cases = [
            (
                "/api/auth/reset-password",
                serde_json::json!({ "email": EMAIL, "otp": "12ab56", "newPassword": "new-password" }),
            ),
            (
                "/api/auth/reset-password",
                serde_json::json!({ "email": EMAIL, "otp": "123456" }),
            ),
            (
                "/api/auth/reset-password",
                serde_json::json!({ "email": EMAIL, "otp": 123456, "newPassword": "new-password" }),
            ),
            ("/api/auth/forgot-password", serde_json::json!({ "mail": EMAIL })),
            ("/api/auth/register", serde_json::json!({ "email": EMAIL })),
            ("/api/auth/login", serde_json::json!({ "email": "not-an-email", "password": "x" })),
        ];

        for (uri, body) in cases {
            let (status, response) = send(&app.router, "POST", uri, Some(body.clone()), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
            assert_eq!(response["success"], false, "{} {}", uri, body);
            assert_eq!(response["error"], "Validation failed");
            assert!(response["message"].is_string());
        }
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = test_app();
        register(&app, "password").await;

        let (status, _) = send(
            &app.router,
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({ "name": "Other", "email": EMAIL, "password": "password" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn profile_requires_valid_token() {
        let app = test_app();
        let (status, _) = send(&app.router, "GET", "/api/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app.router, "GET", "/api/auth/profile", None, Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
