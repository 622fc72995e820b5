//! User account store.
//!
//! Stateless service over the backend's auth operations. The logged-in
//! identity itself lives in the request session, never here, so "logged in"
//! is always derived from the presence of a current user rather than from a
//! separately tracked flag.

use chrono::Utc;
use tracing::instrument;

use orchard_core::{Account, Email, UserId, UserProfile};

use crate::backend::SharedBackend;

use super::StoreError;

/// Matches the hosted auth service's minimum.
const MIN_PASSWORD_LENGTH: usize = 6;

pub struct UserStore {
    backend: SharedBackend,
}

impl UserStore {
    #[must_use]
    pub const fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Validate a credential pair before it is sent anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] naming the first problem
    /// found.
    pub fn check_valid_credentials(email: &str, password: &str) -> Result<Email, StoreError> {
        let email = Email::parse(email)
            .map_err(|e| StoreError::InvalidArgument(format!("invalid email: {e}")))?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(StoreError::InvalidArgument(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        Ok(email)
    }

    /// Register a new account. The backend assigns the account id; a profile
    /// document is written alongside when a name was provided.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] for bad input,
    /// [`StoreError::AlreadyExists`] if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Account, StoreError> {
        let email = Self::check_valid_credentials(email, password)?;

        let account = self.backend.create_account(&email, password).await?;

        if let Some(full_name) = full_name.map(str::trim).filter(|s| !s.is_empty()) {
            self.backend
                .set_profile(&UserProfile {
                    id: account.id.clone(),
                    email: account.email.clone(),
                    full_name: full_name.to_owned(),
                    created_at: Utc::now(),
                })
                .await?;
        }

        Ok(account)
    }

    /// Authenticate with an email and password.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthenticated`] for a wrong password or an
    /// unknown email, without revealing which.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, StoreError> {
        let email = Self::check_valid_credentials(email, password)
            .map_err(|_| StoreError::Unauthenticated)?;

        Ok(self.backend.sign_in(&email, password).await?)
    }

    /// End the backend-side session, if the backend keeps one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendUnavailable`] if the backend cannot be
    /// reached.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), StoreError> {
        Ok(self.backend.sign_out().await?)
    }

    /// Fetch the profile document for an account, if one was written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendUnavailable`] if the backend cannot be
    /// reached.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn profile(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.backend.get_profile(id).await?)
    }
}
