//! Persistence backend abstraction.
//!
//! The storefront reads and writes two collections (`products`, `users`) and
//! delegates credential handling to an auth service. Both concerns sit behind
//! the [`Backend`] trait so the in-memory mock and the hosted Firestore
//! variant are interchangeable collaborators.
//!
//! Identifier strategy: every id is backend-assigned. The stores never mint
//! ids of their own.

pub mod firestore;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use orchard_core::{Account, Email, NewProduct, Product, ProductId, ProductOrder, UserId, UserProfile};

pub use firestore::{FirestoreBackend, FirestoreConfig};
pub use memory::MemoryBackend;

/// Errors surfaced by a persistence backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,

    /// An account with this email is already registered.
    #[error("an account with this email already exists")]
    EmailExists,

    /// The email/password pair did not authenticate.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The auth service rejected the password.
    #[error("password rejected: {0}")]
    WeakPassword(String),

    /// The backend could not be reached.
    #[error("backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with an unexpected status or payload.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend asked us to back off.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// A stored document could not be decoded into a domain type.
    #[error("malformed backend document: {0}")]
    Decode(String),
}

/// A shared, dynamically-dispatched backend handle.
pub type SharedBackend = Arc<dyn Backend>;

/// Document persistence plus credential-based authentication.
///
/// Mirrors the capability set the storefront actually needs: an ordered
/// collection query, point reads and writes on documents, and a three-call
/// auth surface with a stable account identifier.
#[async_trait]
pub trait Backend: Send + Sync {
    // =========================================================================
    // Products collection
    // =========================================================================

    /// Query the product collection, ordered by the given clause.
    async fn list_products(&self, order_by: ProductOrder) -> Result<Vec<Product>, BackendError>;

    /// Point lookup; `Ok(None)` if the document does not exist.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError>;

    /// Persist a new product. The backend assigns the id and `created_at`.
    async fn create_product(&self, new: NewProduct) -> Result<Product, BackendError>;

    /// Full-document write of an existing product.
    async fn set_product(&self, product: &Product) -> Result<(), BackendError>;

    /// Delete a product document.
    ///
    /// Returns [`BackendError::NotFound`] if the document does not exist.
    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError>;

    // =========================================================================
    // Auth service
    // =========================================================================

    /// Create an account from email + password, returning its stable id.
    async fn create_account(&self, email: &Email, password: &str)
    -> Result<Account, BackendError>;

    /// Authenticate; fails with [`BackendError::InvalidCredentials`].
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Account, BackendError>;

    /// Invalidate the provider-side session, if the provider has one.
    async fn sign_out(&self) -> Result<(), BackendError>;

    // =========================================================================
    // Profile documents
    // =========================================================================

    /// Fetch the profile document keyed by the stable account id.
    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError>;

    /// Write a profile document keyed by its stable account id.
    async fn set_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;

    // =========================================================================
    // Health
    // =========================================================================

    /// Cheap connectivity probe for the readiness endpoint.
    async fn ping(&self) -> Result<(), BackendError>;
}
