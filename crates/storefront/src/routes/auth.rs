//! Authentication route handlers.
//!
//! Login and registration are form submissions that answer with redirects:
//! back to the same page with an `?error=` slug on failure, or to the
//! catalog on success. The session is the only place the identity lives.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::stores::StoreError;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub full_name: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Payload the auth pages render from.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// `GET /login` - the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        error: query.error,
        success: query.success,
    })
}

/// `POST /login` - handle a login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.users().login(&form.email, &form.password).await {
        Ok(account) => {
            let mut user = CurrentUser::from(account);

            // Best effort; a missing or unreachable profile never blocks login
            match state.users().profile(&user.id).await {
                Ok(profile) => user.full_name = profile.map(|p| p.full_name),
                Err(e) => tracing::warn!(error = %e, "failed to fetch profile"),
            }

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!(error = %e, "failed to write session");
                return Redirect::to("/login?error=session").into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(StoreError::Unauthenticated) => {
            tracing::warn!("login failed: bad credentials");
            Redirect::to("/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "login failed");
            Redirect::to("/login?error=unavailable").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// `GET /register` - the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        error: query.error,
        success: query.success,
    })
}

/// `POST /register` - handle a registration form submission.
///
/// Registration does not sign the new account in; the visitor is sent to
/// the login page instead.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/register?error=password_mismatch").into_response();
    }

    match state
        .users()
        .register(&form.email, &form.password, form.full_name.as_deref())
        .await
    {
        Ok(account) => {
            tracing::info!(id = %account.id, "account registered");
            Redirect::to("/login?success=registered").into_response()
        }
        Err(StoreError::AlreadyExists(_)) => {
            Redirect::to("/register?error=email_taken").into_response()
        }
        Err(StoreError::InvalidArgument(_)) => {
            Redirect::to("/register?error=invalid").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "registration failed");
            Redirect::to("/register?error=failed").into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// `POST /logout` - end the session and return to the login page.
///
/// A session that cannot be cleared is a server fault, not something to
/// paper over with a redirect.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> crate::error::Result<Response> {
    if let Err(e) = state.users().logout().await {
        tracing::warn!(error = %e, "backend sign-out failed");
    }

    clear_current_user(&session).await?;
    session.flush().await?;

    clear_sentry_user();
    Ok(Redirect::to("/login").into_response())
}
