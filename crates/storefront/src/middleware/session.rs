//! Session middleware configuration.
//!
//! Sets up signed, in-memory sessions using tower-sessions. The store is
//! process-local; a restart simply logs everyone out.

use secrecy::ExposeSecret;
use tower_sessions::{
    Expiry, MemoryStore, SessionManagerLayer, cookie::Key, service::SignedCookie,
};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "orchard_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with a signed in-memory store.
///
/// The signing key is derived from the configured session secret, which
/// config validation guarantees is long enough for key derivation.
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();

    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    // Secure cookies only when served over HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
