//! Application stores.
//!
//! Stores own in-process state and wrap the persistence backend with the
//! application's semantics: validation, merge rules, and a unified error
//! vocabulary. Every failure is surfaced as a [`StoreError`] so callers can
//! react uniformly no matter which backend is configured.

pub mod products;
pub mod users;

pub use products::ProductStore;
pub use users::UserStore;

use crate::backend::BackendError;

/// Unified failure vocabulary for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A uniqueness constraint was violated.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Credentials were missing or wrong.
    #[error("authentication failed")]
    Unauthenticated,

    /// The persistence backend could not complete the operation.
    #[error("backend unavailable")]
    BackendUnavailable(#[source] BackendError),
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound => Self::NotFound("entity not found".to_owned()),
            BackendError::EmailExists => {
                Self::AlreadyExists("an account with this email already exists".to_owned())
            }
            BackendError::InvalidCredentials => Self::Unauthenticated,
            BackendError::WeakPassword(reason) => Self::InvalidArgument(reason),
            other => Self::BackendUnavailable(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        assert!(matches!(
            StoreError::from(BackendError::NotFound),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            StoreError::from(BackendError::EmailExists),
            StoreError::AlreadyExists(_)
        ));
        assert!(matches!(
            StoreError::from(BackendError::InvalidCredentials),
            StoreError::Unauthenticated
        ));
        assert!(matches!(
            StoreError::from(BackendError::WeakPassword("too short".to_owned())),
            StoreError::InvalidArgument(_)
        ));
        assert!(matches!(
            StoreError::from(BackendError::RateLimited(5)),
            StoreError::BackendUnavailable(_)
        ));
    }
}
