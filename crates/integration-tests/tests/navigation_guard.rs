//! Integration tests for the navigation guard.
//!
//! Anonymous visitors may only reach the auth pages and health endpoints;
//! logged-in visitors are bounced away from the auth pages instead.

use axum::http::{Method, StatusCode};
use serde_json::json;

use orchard_integration_tests::TestApp;

#[tokio::test]
async fn test_anonymous_catalog_visit_redirects_to_login() {
    let mut app = TestApp::new();

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));

    let response = app.get("/details/some-id").await;
    assert_eq!(response.location(), Some("/login"));

    let response = app.get("/checkout/some-id").await;
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_anonymous_mutation_gets_unauthorized() {
    let mut app = TestApp::new();

    let response = app
        .send_json(Method::POST, "/products", &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.delete("/products/some-id").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_can_reach_auth_pages() {
    let mut app = TestApp::new();

    assert_eq!(app.get("/login").await.status, StatusCode::OK);
    assert_eq!(app.get("/register").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logged_in_visitor_is_bounced_off_auth_pages() {
    let mut app = TestApp::new();
    app.login().await;

    let response = app.get("/login").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let response = app.get("/register").await;
    assert_eq!(response.location(), Some("/"));
}

#[tokio::test]
async fn test_logged_in_visitor_reaches_the_catalog() {
    let mut app = TestApp::new();
    app.login().await;

    assert_eq!(app.get("/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoints_skip_the_guard() {
    let mut app = TestApp::new();

    assert_eq!(app.get("/health").await.status, StatusCode::OK);
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_protected_path_redirects_before_404() {
    let mut app = TestApp::new();

    let response = app.get("/no/such/page").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}
