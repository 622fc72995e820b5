//! Integration tests for registration, login, and logout.

use axum::http::StatusCode;

use orchard_integration_tests::TestApp;

const EMAIL: &str = "buyer@example.com";
const PASSWORD: &str = "hunter22";

async fn register(app: &mut TestApp, email: &str, password: &str) -> (StatusCode, Option<String>) {
    let response = app
        .post_form(
            "/register",
            &[
                ("email", email),
                ("password", password),
                ("password_confirm", password),
            ],
        )
        .await;
    (response.status, response.location().map(str::to_owned))
}

async fn login(app: &mut TestApp, email: &str, password: &str) -> (StatusCode, Option<String>) {
    let response = app
        .post_form("/login", &[("email", email), ("password", password)])
        .await;
    (response.status, response.location().map(str::to_owned))
}

#[tokio::test]
async fn test_register_redirects_to_login_without_a_session() {
    let mut app = TestApp::new();

    let (status, location) = register(&mut app, EMAIL, PASSWORD).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login?success=registered"));

    // Registration alone does not open the catalog
    let response = app.get("/").await;
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_register_with_full_name() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/register",
            &[
                ("email", EMAIL),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
                ("full_name", "Ada Lovelace"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login?success=registered"));
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/register",
            &[
                ("email", EMAIL),
                ("password", PASSWORD),
                ("password_confirm", "different"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/register?error=password_mismatch"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mut app = TestApp::new();
    register(&mut app, EMAIL, PASSWORD).await;

    let (_, location) = register(&mut app, EMAIL, PASSWORD).await;
    assert_eq!(location.as_deref(), Some("/register?error=email_taken"));
}

#[tokio::test]
async fn test_register_invalid_input() {
    let mut app = TestApp::new();

    let (_, location) = register(&mut app, "not-an-email", PASSWORD).await;
    assert_eq!(location.as_deref(), Some("/register?error=invalid"));

    let (_, location) = register(&mut app, EMAIL, "short").await;
    assert_eq!(location.as_deref(), Some("/register?error=invalid"));
}

#[tokio::test]
async fn test_login_roundtrip() {
    let mut app = TestApp::new();
    register(&mut app, EMAIL, PASSWORD).await;

    let (status, location) = login(&mut app, EMAIL, PASSWORD).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));

    assert_eq!(app.get("/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut app = TestApp::new();
    register(&mut app, EMAIL, PASSWORD).await;

    let (_, location) = login(&mut app, EMAIL, "wrong-password").await;
    assert_eq!(location.as_deref(), Some("/login?error=credentials"));

    // Still anonymous
    let response = app.get("/").await;
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_login_unknown_account_looks_like_bad_credentials() {
    let mut app = TestApp::new();

    let (_, location) = login(&mut app, "nobody@example.com", PASSWORD).await;
    assert_eq!(location.as_deref(), Some("/login?error=credentials"));
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let mut app = TestApp::new();
    app.login().await;

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));

    // Back to anonymous: the catalog redirects again
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_auth_pages_echo_error_slugs() {
    let mut app = TestApp::new();

    let page = app.get("/login?error=credentials").await.json();
    assert_eq!(page["error"], "credentials");
    assert!(page["success"].is_null());
}
