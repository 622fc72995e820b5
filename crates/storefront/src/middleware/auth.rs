//! Authentication middleware and extractors.
//!
//! The navigation guard enforces the public/protected split for every
//! request; the extractors give handlers typed access to the session
//! identity. Both derive "logged in" solely from the presence of a
//! [`CurrentUser`] in the session.

use axum::{
    extract::{FromRequestParts, Request},
    http::{Method, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

// =============================================================================
// Navigation Guard
// =============================================================================

/// What the guard decided for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through.
    Allow,
    /// Anonymous visitor on a protected path.
    RedirectToLogin,
    /// Logged-in visitor on an auth page.
    RedirectToHome,
}

/// Pure routing rule: which paths are public, and which direction to
/// redirect when the visitor is on the wrong side of the line.
///
/// Health endpoints are always exempt so probes never touch the session.
#[must_use]
pub fn guard_decision(path: &str, logged_in: bool) -> GuardDecision {
    if path == "/health" || path.starts_with("/health/") {
        return GuardDecision::Allow;
    }

    let is_public = matches!(path, "/login" | "/register");

    match (is_public, logged_in) {
        (true, true) => GuardDecision::RedirectToHome,
        (false, false) => GuardDecision::RedirectToLogin,
        _ => GuardDecision::Allow,
    }
}

/// Middleware applying [`guard_decision`] to every request.
///
/// Must sit inside the session layer. Navigations (GET) are redirected;
/// other methods get a plain `401` so API callers see the real status.
pub async fn navigation_guard(request: Request, next: Next) -> Response {
    let logged_in = match request.extensions().get::<Session>() {
        Some(session) => session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .is_some(),
        None => false,
    };

    match guard_decision(request.uri().path(), logged_in) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToHome => Redirect::to("/").into_response(),
        GuardDecision::RedirectToLogin => {
            if request.method() == Method::GET {
                Redirect::to("/login").into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that requires a logged-in user.
///
/// The navigation guard already turns anonymous requests away, so a
/// rejection here only happens when a handler is reached outside the
/// guarded router.
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// Redirect to the login page (for navigations).
    RedirectToLogin,
    /// Unauthorized response (no session infrastructure present).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user without rejecting.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Store the authenticated identity in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the authenticated identity from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_visitor_on_protected_paths() {
        assert_eq!(guard_decision("/", false), GuardDecision::RedirectToLogin);
        assert_eq!(
            guard_decision("/details/abc", false),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            guard_decision("/checkout/abc", false),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            guard_decision("/products", false),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_anonymous_visitor_on_auth_pages() {
        assert_eq!(guard_decision("/login", false), GuardDecision::Allow);
        assert_eq!(guard_decision("/register", false), GuardDecision::Allow);
    }

    #[test]
    fn test_logged_in_visitor_on_auth_pages() {
        assert_eq!(guard_decision("/login", true), GuardDecision::RedirectToHome);
        assert_eq!(
            guard_decision("/register", true),
            GuardDecision::RedirectToHome
        );
    }

    #[test]
    fn test_logged_in_visitor_on_protected_paths() {
        assert_eq!(guard_decision("/", true), GuardDecision::Allow);
        assert_eq!(guard_decision("/details/abc", true), GuardDecision::Allow);
    }

    #[test]
    fn test_unknown_paths_are_protected_by_default() {
        assert_eq!(
            guard_decision("/completely/unknown", false),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_health_endpoints_are_exempt() {
        assert_eq!(guard_decision("/health", false), GuardDecision::Allow);
        assert_eq!(guard_decision("/health/ready", false), GuardDecision::Allow);
        assert_eq!(guard_decision("/health", true), GuardDecision::Allow);
    }
}
