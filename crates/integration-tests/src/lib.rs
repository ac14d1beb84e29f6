//! Integration test support for Maison.
//!
//! Tests drive the real router in-process: a fresh store per test, the
//! full middleware stack, and session cookies carried between requests.
//! No server process or external service is needed.
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let session = ctx.claim_account("me").await;
//! let (status, body) = ctx
//!     .post("/bookings/2026/toggle", &session, json!({"date": "2026-07-15"}))
//!     .await;
//! ```

// Test support crate: panicking on malformed test fixtures is the point.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use maison_server::store::MemoryStore;
use maison_server::{AppState, ServerConfig, app, seed};

/// A session cookie returned by login/signup, replayed on later requests.
#[derive(Debug, Clone)]
pub struct SessionCookie(String);

/// In-process application under test.
pub struct TestContext {
    router: Router,
    /// The store behind the router, for direct fixture setup and asserts.
    pub store: MemoryStore,
}

impl TestContext {
    /// Build an app with a fresh in-memory store and the seeded household
    /// roster.
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        seed::seed_users(&store).await.expect("seed users");

        let config = test_config();
        let state = AppState::new(config, store.clone());
        Self {
            router: app(state),
            store,
        }
    }

    /// Claim a seeded account with a default test password and return its
    /// session cookie.
    pub async fn claim_account(&self, user: &str) -> SessionCookie {
        let response = self
            .send(
                Request::post("/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"user": user, "password": test_password()}).to_string(),
                    ))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.0, StatusCode::OK, "signup failed: {:?}", response.2);
        response.1.expect("signup sets a session cookie")
    }

    /// GET a path with an optional session.
    pub async fn get(&self, path: &str, session: &SessionCookie) -> (StatusCode, Value) {
        let request = Request::get(path)
            .header(header::COOKIE, &session.0)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// GET a path and return the raw response without reading the body.
    ///
    /// Needed for the SSE endpoint, whose body never ends.
    pub async fn get_raw(&self, path: &str, session: &SessionCookie) -> Response<Body> {
        let request = Request::get(path)
            .header(header::COOKIE, &session.0)
            .body(Body::empty())
            .unwrap();
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails")
    }

    /// GET a path without a session.
    pub async fn get_anonymous(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::get(path).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// POST a JSON payload with a session.
    pub async fn post(
        &self,
        path: &str,
        session: &SessionCookie,
        payload: Value,
    ) -> (StatusCode, Value) {
        self.request_with_body("POST", path, session, payload).await
    }

    /// PATCH a JSON payload with a session.
    pub async fn patch(
        &self,
        path: &str,
        session: &SessionCookie,
        payload: Value,
    ) -> (StatusCode, Value) {
        self.request_with_body("PATCH", path, session, payload).await
    }

    /// DELETE a path with a session.
    pub async fn delete(&self, path: &str, session: &SessionCookie) -> (StatusCode, Value) {
        let request = Request::delete(path)
            .header(header::COOKIE, &session.0)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// POST a JSON payload without a session.
    pub async fn post_anonymous(&self, path: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    async fn request_with_body(
        &self,
        method: &str,
        path: &str,
        session: &SessionCookie,
        payload: Value,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &session.0)
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// Drive one request through the router.
    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<SessionCookie>, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| SessionCookie(v.to_owned()));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };

        (status, cookie, body)
    }
}

/// The password every claimed test account uses.
#[must_use]
pub fn test_password() -> &'static str {
    "correct-horse-battery"
}

/// A valid configuration that never reads the environment.
fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".parse().expect("loopback address"),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("kP9mX2vQ7nR4tY8wZ3cB6dF1gH5jL0aN".to_owned()),
        store_path: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}
