//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (pings the backend)
//!
//! # Catalog (requires auth)
//! GET    /                     - Product listing (?search= and ?sort=)
//! GET    /details/{id}         - Product detail
//! POST   /products             - Create product
//! PUT    /products/{id}        - Update product (partial)
//! DELETE /products/{id}        - Delete product
//!
//! # Checkout (requires auth)
//! GET    /checkout/{id}        - Checkout summary for one product
//!
//! # Auth (public)
//! GET    /login                - Login page
//! POST   /login                - Login action
//! GET    /register             - Register page
//! POST   /register             - Register action
//! POST   /logout               - Logout action (requires auth)
//! ```

pub mod auth;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/details/{id}", get(products::show))
        .route("/products", post(products::create))
        .route("/products/{id}", put(products::update))
        .route("/products/{id}", delete(products::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/checkout/{id}", get(checkout::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Liveness check.
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness check; verifies the persistence backend answers.
pub async fn readiness(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    match state.backend().ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable")
        }
    }
}
