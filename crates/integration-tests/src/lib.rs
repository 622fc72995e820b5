//! Integration test harness for Orchard.
//!
//! Drives the storefront router in-process with `tower::ServiceExt::oneshot`
//! against the seeded in-memory backend, so no server, database, or network
//! is needed. The harness keeps the session cookie between requests, which
//! is enough to walk the full login/guard/logout flow.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;

use orchard_storefront::backend::MemoryBackend;
use orchard_storefront::config::{BackendSelection, StorefrontConfig};
use orchard_storefront::state::AppState;

/// A response captured from the in-process router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// The `Location` header, for asserting redirects.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not valid JSON")
    }
}

/// The storefront app plus a cookie jar.
pub struct TestApp {
    router: Router,
    session_cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build the app over a freshly seeded in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_owned(),
            session_secret: SecretString::from("x".repeat(64)),
            backend: BackendSelection::Memory,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config, Arc::new(MemoryBackend::seeded()));

        Self {
            router: orchard_storefront::build_app(state),
            session_cookie: None,
        }
    }

    /// Send one request, carrying the stored session cookie and capturing
    /// any new one from the response.
    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let mut request = request;
        if let Some(cookie) = &self.session_cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails");

        let (parts, body) = response.into_parts();
        if let Some(set_cookie) = parts
            .headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            // Keep only the name=value pair
            if let Some(pair) = set_cookie.split(';').next() {
                self.session_cookie = Some(pair.trim().to_owned());
            }
        }

        let body = body.collect().await.expect("body read").to_bytes().to_vec();

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(encode_form(form)))
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(
        &mut self,
        method: Method,
        uri: &str,
        body: &serde_json::Value,
    ) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Register and sign in a fixed test account, asserting the happy path.
    pub async fn login(&mut self) {
        let response = self
            .post_form(
                "/register",
                &[
                    ("email", "buyer@example.com"),
                    ("password", "hunter22"),
                    ("password_confirm", "hunter22"),
                ],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/login?success=registered"));

        let response = self
            .post_form(
                "/login",
                &[("email", "buyer@example.com"), ("password", "hunter22")],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/"));
    }
}

/// Encode form pairs as an `application/x-www-form-urlencoded` body.
fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
