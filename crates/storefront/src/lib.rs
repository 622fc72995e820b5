//! Orchard Storefront library.
//!
//! This crate provides the storefront functionality as a library, allowing
//! it to be tested in-process and reused by the binary in `main.rs`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the core application stack: routes, navigation guard, and sessions.
///
/// Production-only middleware (rate limiting, request IDs, Sentry layers) is
/// added on top of this in `main.rs`; integration tests drive this router
/// directly.
pub fn build_app(state: AppState) -> Router {
    build_app_with(state, None)
}

/// [`build_app`] with an optional rate limiter applied to the auth routes.
///
/// Kept separate so tests can drive the router without having to fabricate
/// client IPs for the limiter's key extractor.
pub fn build_app_with(
    state: AppState,
    auth_limiter: Option<middleware::rate_limit::RateLimiterLayer>,
) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    let mut auth = routes::auth_routes();
    if let Some(limiter) = auth_limiter {
        auth = auth.route_layer(limiter);
    }

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::readiness))
        .merge(routes::catalog_routes())
        .merge(routes::checkout_routes())
        .merge(auth)
        .layer(axum::middleware::from_fn(middleware::navigation_guard))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
